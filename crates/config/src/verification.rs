//! Block explorer verification profile resolution.

use crate::{
    defaults::{CustomEndpoint, Defaults},
    env::Env,
    error::ConfigError,
};
use serde::{Serialize, Serializer};

/// API key reported for networks whose explorer needs none.
pub const NO_API_KEY: &str = "NO NEED API KEY FOR THIS TESTNET";

/// A chain the verification backend knows natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplorerChain {
    pub name: &'static str,
    pub chain_id: u64,
    pub api_url: &'static str,
    pub browser_url: &'static str,
}

/// Chains the Etherscan-family backend supports out of the box.
pub const BUILTIN_EXPLORERS: &[ExplorerChain] = &[
    ExplorerChain {
        name: "mainnet",
        chain_id: 1,
        api_url: "https://api.etherscan.io/api",
        browser_url: "https://etherscan.io",
    },
    ExplorerChain {
        name: "goerli",
        chain_id: 5,
        api_url: "https://api-goerli.etherscan.io/api",
        browser_url: "https://goerli.etherscan.io",
    },
    ExplorerChain {
        name: "sepolia",
        chain_id: 11155111,
        api_url: "https://api-sepolia.etherscan.io/api",
        browser_url: "https://sepolia.etherscan.io",
    },
    ExplorerChain {
        name: "bsc",
        chain_id: 56,
        api_url: "https://api.bscscan.com/api",
        browser_url: "https://bscscan.com",
    },
    ExplorerChain {
        name: "bscTestnet",
        chain_id: 97,
        api_url: "https://api-testnet.bscscan.com/api",
        browser_url: "https://testnet.bscscan.com",
    },
    ExplorerChain {
        name: "optimisticEthereum",
        chain_id: 10,
        api_url: "https://api-optimistic.etherscan.io/api",
        browser_url: "https://optimistic.etherscan.io",
    },
    ExplorerChain {
        name: "optimisticGoerli",
        chain_id: 420,
        api_url: "https://api-goerli-optimism.etherscan.io/api",
        browser_url: "https://goerli-optimism.etherscan.io",
    },
    ExplorerChain {
        name: "arbitrumOne",
        chain_id: 42161,
        api_url: "https://api.arbiscan.io/api",
        browser_url: "https://arbiscan.io",
    },
    ExplorerChain {
        name: "arbitrumGoerli",
        chain_id: 421613,
        api_url: "https://api-goerli.arbiscan.io/api",
        browser_url: "https://goerli.arbiscan.io",
    },
    ExplorerChain {
        name: "polygon",
        chain_id: 137,
        api_url: "https://api.polygonscan.com/api",
        browser_url: "https://polygonscan.com",
    },
    ExplorerChain {
        name: "polygonMumbai",
        chain_id: 80001,
        api_url: "https://api-testnet.polygonscan.com/api",
        browser_url: "https://mumbai.polygonscan.com",
    },
];

/// Look up a chain in the backend's native registry.
pub fn builtin_explorer(name: &str) -> Option<&'static ExplorerChain> {
    BUILTIN_EXPLORERS.iter().find(|chain| chain.name == name)
}

/// Everything needed to submit sources to a block explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationProfile {
    /// Network name
    pub network: String,
    /// Backend chain name
    pub explorer: String,
    #[serde(serialize_with = "redact_key")]
    pub api_key: String,
    /// Set when the backend doesn't know the chain natively
    pub custom_endpoint: Option<CustomEndpoint>,
    pub chain_id: u64,
    pub api_url: String,
    pub browser_url: String,
}

impl VerificationProfile {
    /// Explorer page for a contract address.
    pub fn address_url(&self, address: impl std::fmt::Display) -> String {
        format!(
            "{}/address/{}#code",
            self.browser_url.trim_end_matches('/'),
            address
        )
    }
}

fn redact_key<S: Serializer>(key: &str, serializer: S) -> Result<S::Ok, S::Error> {
    if key == NO_API_KEY {
        serializer.serialize_str(key)
    } else {
        serializer.serialize_str("<redacted>")
    }
}

/// Resolve the verification profile for network `name`.
///
/// A custom endpoint in the defaults wins over the native registry. The API
/// key comes from the configured environment variable, then a literal key,
/// then [`NO_API_KEY`] when the entry names neither.
pub fn resolve_verification(
    name: &str,
    env: &Env,
    defaults: &Defaults,
) -> Result<VerificationProfile, ConfigError> {
    let template = defaults.network(name)?;
    let no_endpoint = || ConfigError::NoVerificationEndpoint(name.to_string());

    if template.local {
        return Err(no_endpoint());
    }

    let entry = defaults.verification.get(name).ok_or_else(no_endpoint)?;
    let explorer = entry.explorer.as_deref().unwrap_or(name);

    let (chain_id, api_url, browser_url) = match (&entry.custom, builtin_explorer(explorer)) {
        (Some(custom), _) => (
            custom.chain_id,
            custom.api_url.clone(),
            custom.browser_url.clone(),
        ),
        (None, Some(chain)) => (
            chain.chain_id,
            chain.api_url.to_string(),
            chain.browser_url.to_string(),
        ),
        (None, None) => return Err(no_endpoint()),
    };

    let from_env = entry
        .api_key_env
        .as_deref()
        .and_then(|variable| env.get(variable));

    let api_key = match (from_env, &entry.api_key, &entry.api_key_env) {
        (Some(key), _, _) => key.to_string(),
        (None, Some(literal), _) => literal.clone(),
        (None, None, Some(variable)) => {
            return Err(ConfigError::MissingSecret {
                network: name.to_string(),
                variable: variable.clone(),
            })
        }
        (None, None, None) => NO_API_KEY.to_string(),
    };

    Ok(VerificationProfile {
        network: name.to_string(),
        explorer: explorer.to_string(),
        api_key,
        custom_endpoint: entry.custom.clone(),
        chain_id,
        api_url,
        browser_url,
    })
}
