//! Parameters of the application's internal logic.

use serde::Serialize;

use super::fields::Fields;
use super::ConfigError;

#[derive(Debug, Clone, Serialize)]
pub struct InternalSettings {
    /// Seed for any deterministic randomness.
    pub random_seed: u64,
}

impl InternalSettings {
    pub(crate) fn from_fields(fields: &Fields<'_>) -> Result<Self, ConfigError> {
        Ok(InternalSettings {
            random_seed: fields.parse("RANDOM_SEED")?,
        })
    }
}
