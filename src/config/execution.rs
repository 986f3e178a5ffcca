//! Outbound call timeout and retry settings.

use serde::Serialize;
use std::time::Duration;

use super::fields::Fields;
use super::{duration, ConfigError};

/// Outbound HTTP call settings.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionSettings {
    /// Session timeout for outbound HTTP calls.
    #[serde(serialize_with = "duration::serialize")]
    pub http_client_timeout: Duration,
    /// Retry behavior for failed calls.
    pub retry: RetrySettings,
}

/// Retry settings for failed operations.
#[derive(Debug, Clone, Serialize)]
pub struct RetrySettings {
    /// Give up once this much time has passed since the first attempt.
    #[serde(serialize_with = "duration::serialize")]
    pub stop_after_delay: Duration,
    /// Maximum number of attempts.
    pub stop_after_attempt: u32,
    /// Fixed wait between attempts.
    #[serde(serialize_with = "duration::serialize")]
    pub wait_fixed: Duration,
    /// Lower bound of the random jitter added to the fixed wait.
    #[serde(serialize_with = "duration::serialize")]
    pub wait_random_min: Duration,
    /// Upper bound of the random jitter added to the fixed wait.
    #[serde(serialize_with = "duration::serialize")]
    pub wait_random_max: Duration,
}

impl ExecutionSettings {
    pub(crate) fn from_fields(fields: &Fields<'_>) -> Result<Self, ConfigError> {
        Ok(ExecutionSettings {
            http_client_timeout: fields.positive_duration("HTTP_CLIENT_TIMEOUT_SECONDS")?,
            retry: RetrySettings::from_fields(fields)?,
        })
    }
}

impl RetrySettings {
    fn from_fields(fields: &Fields<'_>) -> Result<Self, ConfigError> {
        let retry = RetrySettings {
            stop_after_delay: fields.positive_duration("RETRY_STOP_AFTER_DELAY_SECONDS")?,
            stop_after_attempt: fields.positive_u32("RETRY_STOP_AFTER_ATTEMPT")?,
            wait_fixed: fields.duration("RETRY_WAIT_FIXED_SECONDS")?,
            wait_random_min: fields.duration("RETRY_WAIT_RANDOM_MIN_SECONDS")?,
            wait_random_max: fields.positive_duration("RETRY_WAIT_RANDOM_MAX_SECONDS")?,
        };

        if retry.wait_random_min > retry.wait_random_max {
            return Err(ConfigError::invalid(
                "RETRY_WAIT_RANDOM_MIN_SECONDS",
                format!(
                    "{} exceeds RETRY_WAIT_RANDOM_MAX_SECONDS ({})",
                    duration::format_duration(retry.wait_random_min),
                    duration::format_duration(retry.wait_random_max)
                ),
            ));
        }

        Ok(retry)
    }
}
