use thiserror::Error;

/// Errors raised while resolving configuration.
///
/// All of these are detected before any network call is attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The requested network is not in the registry.
    #[error("Unsupported network `{name}` (supported: {supported})")]
    UnsupportedNetwork { name: String, supported: String },

    /// A secret referenced by the network's template is not set.
    #[error("Network `{network}` requires `{variable}` to be set")]
    MissingSecret { network: String, variable: String },

    /// A value is present but malformed.
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },

    /// `SOLIDITY_SETTINGS` is not valid compiler settings JSON.
    #[error("Invalid compiler settings: {0}")]
    InvalidSettings(String),

    /// No explorer is known for the network and none is configured.
    #[error("No verification endpoint configured for network `{0}`")]
    NoVerificationEndpoint(String),

    /// The defaults registry or an overlay file could not be loaded.
    #[error("Invalid network defaults: {0}")]
    Defaults(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.to_string(),
        }
    }
}
