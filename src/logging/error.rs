//! Logger façade error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Logger misuse or setup failure.
///
/// Emission itself never fails; these errors come from converting caller
/// input at the façade boundary or from resolving settings on first use.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("log context must be a mapping, got {found}")]
    ContextType { found: &'static str },
    #[error("log context value for '{key}' must be a string, number or boolean, got {found}")]
    ContextValue { key: String, found: &'static str },
    #[error("invalid log metadata: {0}")]
    Metadata(String),
    #[error("settings unavailable: {0}")]
    Config(#[from] ConfigError),
}
