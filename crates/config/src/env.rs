//! Injected environment mapping.
//!
//! Resolution never reads the process environment directly; callers build an
//! [`Env`] (usually with [`Env::from_process`] in a binary) and pass it in.

use std::{collections::HashMap, fmt};

/// Gateway project key interpolated into Infura endpoints.
pub const INFURA_KEY: &str = "INFURA_KEY";
/// Mnemonic phrase for account derivation.
pub const MNEMONIC: &str = "MNEMONIC";
/// Hex private key; takes precedence over [`MNEMONIC`].
pub const PRIVATE_KEY: &str = "PRIVATE_KEY";
/// Default transacting address.
pub const FROM: &str = "FROM";
/// Enables gas usage reporting.
pub const REPORT_GAS: &str = "REPORT_GAS";
/// Overrides the primary compiler version.
pub const SOLIDITY_VERSION: &str = "SOLIDITY_VERSION";
/// JSON-encoded compiler settings override.
pub const SOLIDITY_SETTINGS: &str = "SOLIDITY_SETTINGS";

/// A flat `name -> value` mapping.
///
/// Empty (or whitespace-only) values are treated as unset so that a blank
/// `MNEMONIC=` line does not shadow a default.
#[derive(Clone, Default)]
pub struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment.
    pub fn from_process() -> Self {
        std::env::vars().collect()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Look up a variable, ignoring empty values.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Whether a boolean-ish flag is switched on.
    ///
    /// Any non-empty value except `0` and `false` counts as set.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|v| !(v == "0" || v.eq_ignore_ascii_case("false")))
    }
}

impl<K, V> FromIterator<(K, V)> for Env
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// Values are secrets more often than not, so only keys are printed.
impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.vars.keys().collect();
        keys.sort();
        f.debug_struct("Env").field("keys", &keys).finish()
    }
}

/// Whether gas usage reporting is enabled.
pub fn report_gas(env: &Env) -> bool {
    env.flag(REPORT_GAS)
}
