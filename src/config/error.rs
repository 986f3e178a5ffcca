//! Configuration error types.

use thiserror::Error;

/// Settings resolution error.
///
/// Every variant is fatal: the process must not start with a partially
/// resolved configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    ReadFile(#[from] std::io::Error),
    #[error("failed to parse settings file: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
    #[error("failed to parse dotenv file: {0}")]
    ParseDotenv(#[from] dotenvy::Error),
    #[error("unknown environment profile '{0}' (expected development, staging or production)")]
    UnknownProfile(String),
    #[error("{field} is required")]
    Missing { field: String },
    #[error("{field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn missing(field: &str) -> Self {
        ConfigError::Missing {
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
