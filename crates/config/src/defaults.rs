//! Static per-network templates, verification entries and compiler defaults.
//!
//! The built-in registry ships as an embedded TOML document. A file of the
//! same shape can be layered on top to add networks or replace entries
//! without code changes.

use crate::{compiler::CompilerSettings, error::ConfigError};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};

const BUILTIN: &str = include_str!("defaults.toml");

/// Endpoint template and transaction policy for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkTemplate {
    /// RPC url, may contain `{VAR}` placeholders
    pub url: String,
    /// Expected chain ID
    pub chain_id: Option<u64>,
    /// Fixed gas price in wei (legacy transactions)
    pub gas_price: Option<u64>,
    /// Development node on the local machine
    #[serde(default)]
    pub local: bool,
}

/// Custom explorer endpoint for chains the verification backend doesn't know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomEndpoint {
    pub chain_id: u64,
    pub api_url: String,
    pub browser_url: String,
}

/// How to verify contracts deployed on one network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerificationEntry {
    /// Backend chain name when it differs from the network name
    pub explorer: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    /// Literal API key
    pub api_key: Option<String>,
    /// Explicit endpoint, takes precedence over the built-in registry
    pub custom: Option<CustomEndpoint>,
}

/// Compiler versions and settings before environment overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerDefaults {
    pub versions: Vec<String>,
    pub settings: Option<CompilerSettings>,
}

/// The complete set of static inputs to resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    pub compiler: CompilerDefaults,
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkTemplate>,
    #[serde(default)]
    pub verification: BTreeMap<String, VerificationEntry>,
}

/// Partial defaults layered over the built-in registry.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Overlay {
    compiler: Option<CompilerDefaults>,
    #[serde(default)]
    networks: BTreeMap<String, NetworkTemplate>,
    #[serde(default)]
    verification: BTreeMap<String, VerificationEntry>,
}

impl Defaults {
    /// The registry compiled into the binary.
    pub fn builtin() -> Result<Self, ConfigError> {
        toml::from_str(BUILTIN).map_err(|e| ConfigError::Defaults(e.to_string()))
    }

    /// Built-in registry, optionally overlaid with the file at `path`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Self::builtin()?;
        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    ConfigError::Defaults(format!("failed to read {}: {e}", path.display()))
                })?;
                defaults.with_overlay(&contents)
            }
            None => Ok(defaults),
        }
    }

    /// Merge a TOML overlay. Entries replace built-ins of the same name.
    pub fn with_overlay(mut self, contents: &str) -> Result<Self, ConfigError> {
        let overlay: Overlay =
            toml::from_str(contents).map_err(|e| ConfigError::Defaults(e.to_string()))?;

        if let Some(compiler) = overlay.compiler {
            self.compiler = compiler;
        }
        self.networks.extend(overlay.networks);
        self.verification.extend(overlay.verification);

        Ok(self)
    }

    /// Look up a network template by name.
    pub fn network(&self, name: &str) -> Result<&NetworkTemplate, ConfigError> {
        self.networks
            .get(name)
            .ok_or_else(|| ConfigError::UnsupportedNetwork {
                name: name.to_string(),
                supported: self.supported_networks().join(", "),
            })
    }

    /// Names of all supported networks, sorted.
    pub fn supported_networks(&self) -> Vec<&str> {
        self.networks.keys().map(String::as_str).collect()
    }
}
