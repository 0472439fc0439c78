//! Network profile resolution.
//!
//! Turns a network name into a fully resolved connection and signing profile
//! using the static templates in [`Defaults`] and the injected [`Env`].

use crate::{
    defaults::Defaults,
    env::{Env, FROM, MNEMONIC, PRIVATE_KEY},
    error::ConfigError,
};
use alloy_primitives::Address;
use regex::{Captures, Regex};
use serde::{Serialize, Serializer};
use std::{fmt, sync::LazyLock};

/// Hardhat's well-known development mnemonic.
///
/// Accounts derived from it are public; never use it outside local networks.
pub const DEFAULT_TEST_MNEMONIC: &str =
    "test test test test test test test test test test test junk";

/// `{VAR}` placeholders in endpoint templates.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    // literal pattern, cannot fail
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap()
});

/// Where signing accounts come from.
#[derive(Clone, PartialEq, Eq)]
pub enum AccountSource {
    /// A single hex private key
    PrivateKey(String),
    /// A BIP-39 phrase accounts are derived from
    Mnemonic(String),
}

impl AccountSource {
    /// Pick the account source: private key, then mnemonic, then the test mnemonic.
    pub fn from_env(env: &Env) -> Self {
        if let Some(key) = env.get(PRIVATE_KEY) {
            return Self::PrivateKey(key.to_string());
        }

        Self::Mnemonic(
            env.get(MNEMONIC)
                .unwrap_or(DEFAULT_TEST_MNEMONIC)
                .to_string(),
        )
    }

    /// Whether this is the public development mnemonic.
    pub fn is_test_mnemonic(&self) -> bool {
        matches!(self, Self::Mnemonic(phrase) if phrase == DEFAULT_TEST_MNEMONIC)
    }

    const fn kind(&self) -> &'static str {
        match self {
            Self::PrivateKey(_) => "privateKey",
            Self::Mnemonic(_) => "mnemonic",
        }
    }
}

impl fmt::Debug for AccountSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_test_mnemonic() {
            return f.write_str("Mnemonic(<test mnemonic>)");
        }
        match self {
            Self::PrivateKey(_) => f.write_str("PrivateKey(<redacted>)"),
            Self::Mnemonic(_) => f.write_str("Mnemonic(<redacted>)"),
        }
    }
}

impl Serialize for AccountSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_test_mnemonic() {
            serializer.serialize_str("testMnemonic")
        } else {
            serializer.serialize_str(self.kind())
        }
    }
}

/// Resolved connection and signing parameters for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkProfile {
    /// Network name (registry key)
    pub name: String,
    /// RPC endpoint with all placeholders substituted
    pub endpoint_url: String,
    /// Expected chain ID, checked against the node before transacting
    pub chain_id: Option<u64>,
    /// Signing account source
    pub account_source: AccountSource,
    /// Fixed gas price in wei
    pub gas_price: Option<u64>,
    /// Default transacting address
    pub from: Option<Address>,
    /// Development node on the local machine
    pub local: bool,
}

/// Resolve the profile for network `name`.
///
/// Performs no I/O. Fails when the network is unknown, when the endpoint
/// needs a secret that `env` doesn't provide, or when `FROM` is malformed.
pub fn resolve_network(
    name: &str,
    env: &Env,
    defaults: &Defaults,
) -> Result<NetworkProfile, ConfigError> {
    let template = defaults.network(name)?;

    let endpoint_url = interpolate(name, &template.url, env)?;

    let from = env
        .get(FROM)
        .map(|raw| {
            raw.parse::<Address>()
                .map_err(|e| ConfigError::invalid(FROM, e))
        })
        .transpose()?;

    Ok(NetworkProfile {
        name: name.to_string(),
        endpoint_url,
        chain_id: template.chain_id,
        account_source: AccountSource::from_env(env),
        gas_price: template.gas_price,
        from,
        local: template.local,
    })
}

/// Substitute `{VAR}` placeholders from `env`.
fn interpolate(network: &str, template: &str, env: &Env) -> Result<String, ConfigError> {
    let mut missing = None;

    let resolved = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        let variable = &caps[1];
        env.get(variable).map_or_else(
            || {
                missing.get_or_insert_with(|| variable.to_string());
                String::new()
            },
            str::to_string,
        )
    });

    if let Some(variable) = missing {
        return Err(ConfigError::MissingSecret {
            network: network.to_string(),
            variable,
        });
    }

    Ok(resolved.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::INFURA_KEY;
    use alloy_primitives::address;

    fn full_env() -> Env {
        Env::new().with(INFURA_KEY, "project123")
    }

    #[test]
    fn test_all_networks_resolve_without_placeholders() {
        let defaults = Defaults::builtin().unwrap();
        let env = full_env();

        for name in defaults.supported_networks() {
            let profile = resolve_network(name, &env, &defaults).unwrap();
            assert_eq!(profile.name, name);
            assert!(
                !PLACEHOLDER.is_match(&profile.endpoint_url),
                "{name} left a placeholder in {}",
                profile.endpoint_url
            );
            assert!(!profile.endpoint_url.contains('{'));
        }
    }

    #[test]
    fn test_infura_key_is_interpolated() {
        let defaults = Defaults::builtin().unwrap();
        let profile = resolve_network("mainnet", &full_env(), &defaults).unwrap();

        assert_eq!(profile.endpoint_url, "https://mainnet.infura.io/v3/project123");
        assert_eq!(profile.chain_id, Some(1));
        assert!(!profile.local);
    }

    #[test]
    fn test_missing_gateway_key() {
        let defaults = Defaults::builtin().unwrap();
        let err = resolve_network("sepolia", &Env::new(), &defaults).unwrap_err();

        assert_eq!(
            err,
            ConfigError::MissingSecret {
                network: "sepolia".into(),
                variable: INFURA_KEY.into(),
            }
        );
    }

    #[test]
    fn test_local_and_fixed_endpoints_need_no_key() {
        let defaults = Defaults::builtin().unwrap();

        let hardhat = resolve_network("hardhat", &Env::new(), &defaults).unwrap();
        assert_eq!(hardhat.endpoint_url, "http://127.0.0.1:8545");
        assert!(hardhat.local);

        let bsc = resolve_network("bsc", &Env::new(), &defaults).unwrap();
        assert_eq!(bsc.gas_price, Some(5_000_000_000));
        assert_eq!(bsc.chain_id, Some(56));
    }

    #[test]
    fn test_private_key_takes_precedence() {
        let defaults = Defaults::builtin().unwrap();
        let env = full_env()
            .with(PRIVATE_KEY, "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")
            .with(MNEMONIC, "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about");

        let profile = resolve_network("polygon", &env, &defaults).unwrap();
        assert!(matches!(profile.account_source, AccountSource::PrivateKey(_)));
    }

    #[test]
    fn test_mnemonic_when_no_private_key() {
        let defaults = Defaults::builtin().unwrap();
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        let env = full_env().with(MNEMONIC, phrase);

        let profile = resolve_network("polygon", &env, &defaults).unwrap();
        assert_eq!(profile.account_source, AccountSource::Mnemonic(phrase.into()));
    }

    #[test]
    fn test_falls_back_to_test_mnemonic() {
        let defaults = Defaults::builtin().unwrap();
        let profile = resolve_network("hardhat", &Env::new(), &defaults).unwrap();

        assert_eq!(
            profile.account_source,
            AccountSource::Mnemonic(DEFAULT_TEST_MNEMONIC.into())
        );
        assert!(profile.account_source.is_test_mnemonic());
    }

    #[test]
    fn test_unsupported_network() {
        let defaults = Defaults::builtin().unwrap();
        let err = resolve_network("moonbeam", &full_env(), &defaults).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedNetwork { .. }));
    }

    #[test]
    fn test_from_address() {
        let defaults = Defaults::builtin().unwrap();
        let env = Env::new().with(FROM, "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        let profile = resolve_network("ganache", &env, &defaults).unwrap();
        assert_eq!(
            profile.from,
            Some(address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"))
        );

        let env = Env::new().with(FROM, "not-an-address");
        let err = resolve_network("ganache", &env, &defaults).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field, .. } if field == FROM));
    }

    #[test]
    fn test_secrets_are_not_printed() {
        let defaults = Defaults::builtin().unwrap();
        let env = full_env().with(PRIVATE_KEY, "0xsupersecret");
        let profile = resolve_network("mainnet", &env, &defaults).unwrap();

        assert!(!format!("{profile:?}").contains("supersecret"));
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("supersecret"));
        assert!(json.contains("\"account_source\":\"privateKey\""));
    }
}
