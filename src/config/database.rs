//! Database connection settings.

use serde::Serialize;
use url::Url;

use super::fields::Fields;
use super::{ConfigError, SecretString};

/// Database settings. Credentials are mandatory in every profile.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseSettings {
    pub driver: String,
    pub host: String,
    pub port: u16,
    pub user: SecretString,
    pub password: SecretString,
    pub database: String,
    pub schema: String,
    /// Full DSN; takes precedence over the individual fields when set.
    pub dsn: Option<Url>,
}

impl DatabaseSettings {
    pub(crate) fn from_fields(fields: &Fields<'_>) -> Result<Self, ConfigError> {
        Ok(DatabaseSettings {
            driver: fields.string("DB_DRIVER")?,
            host: fields.string("DB_HOST")?,
            port: fields.parse("DB_PORT")?,
            user: fields.secret("DB_USER")?,
            password: fields.secret("DB_PASSWORD")?,
            database: fields.string("DB_DATABASE")?,
            schema: fields.string("DB_SCHEMA")?,
            dsn: fields.optional_url("DB_DSN", &["postgres", "postgresql"])?,
        })
    }
}
