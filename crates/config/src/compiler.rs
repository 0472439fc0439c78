//! Solidity compiler profile.

use crate::{
    defaults::Defaults,
    env::{Env, SOLIDITY_SETTINGS, SOLIDITY_VERSION},
    error::ConfigError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Optimizer section of the solc standard JSON settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Optimizer {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs: Option<u32>,
}

/// Compiler settings, shaped like solc's standard JSON `settings` object.
///
/// Only the commonly tuned keys are typed; anything else is carried through
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimizer: Option<Optimizer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evm_version: Option<String>,
    #[serde(default, rename = "viaIR", skip_serializing_if = "Option::is_none")]
    pub via_ir: Option<bool>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Resolved compiler versions and settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerProfile {
    /// Primary version first, then fallbacks for pinned dependencies
    pub versions: Vec<String>,
    /// `None` leaves the compiler defaults in place
    pub settings: Option<CompilerSettings>,
}

impl CompilerProfile {
    /// Version used for first-party contracts.
    pub fn primary(&self) -> &str {
        // non-empty by construction
        &self.versions[0]
    }

    /// Versions kept only for dependencies pinned to older compilers.
    pub fn fallbacks(&self) -> &[String] {
        &self.versions[1..]
    }

    /// Whether `version` is one of the configured compilers.
    pub fn supports(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }
}

/// Build the compiler profile from defaults and environment overrides.
///
/// `SOLIDITY_VERSION` replaces the primary version only. `SOLIDITY_SETTINGS`
/// replaces the settings wholesale.
pub fn build_compiler_profile(
    env: &Env,
    defaults: &Defaults,
) -> Result<CompilerProfile, ConfigError> {
    let mut versions = defaults.compiler.versions.clone();

    if let Some(version) = env.get(SOLIDITY_VERSION) {
        match versions.first_mut() {
            Some(primary) => *primary = version.to_string(),
            None => versions.push(version.to_string()),
        }
    }

    if versions.is_empty() {
        return Err(ConfigError::invalid(
            "compiler.versions",
            "at least one version is required",
        ));
    }

    for version in &versions {
        semver::Version::parse(version)
            .map_err(|e| ConfigError::invalid("compiler.versions", format!("{version}: {e}")))?;
    }

    let settings = match env.get(SOLIDITY_SETTINGS) {
        Some(raw) => Some(parse_settings(raw)?),
        None => defaults.compiler.settings.clone(),
    };

    Ok(CompilerProfile { versions, settings })
}

fn parse_settings(raw: &str) -> Result<CompilerSettings, ConfigError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ConfigError::InvalidSettings(e.to_string()))?;

    if !value.is_object() {
        return Err(ConfigError::InvalidSettings(
            "expected a JSON object".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| ConfigError::InvalidSettings(e.to_string()))
}
