//! Remote error reporting settings.

use serde::Serialize;
use url::Url;

use super::fields::Fields;
use super::{ConfigError, Profile};

/// Error reporting settings. Environment and release mirror the app fields.
#[derive(Debug, Clone, Serialize)]
pub struct SentrySettings {
    pub dsn: Option<Url>,
    pub environment: Profile,
    pub release: String,
    /// Share of traces forwarded, derived from the profile.
    pub traces_sample_rate: f64,
}

impl SentrySettings {
    pub(crate) fn from_fields(env: Profile, fields: &Fields<'_>) -> Result<Self, ConfigError> {
        Ok(SentrySettings {
            dsn: fields.optional_url("SENTRY_DSN", &["http", "https"])?,
            environment: env,
            release: fields.string("APP_CI_COMMIT_SHA")?,
            traces_sample_rate: env.traces_sample_rate(),
        })
    }
}
