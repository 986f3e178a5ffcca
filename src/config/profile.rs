//! Environment profiles and their per-field default overrides.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::ConfigError;

/// Deployment environment selected by `APP_ENV_STATE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Development,
    Staging,
    Production,
}

impl Profile {
    pub const ALL: [Profile; 3] = [Profile::Development, Profile::Staging, Profile::Production];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Development => "development",
            Profile::Staging => "staging",
            Profile::Production => "production",
        }
    }

    /// Default values this profile replaces, keyed like the settings sources.
    ///
    /// Applied above the built-in defaults and below the settings file, so a
    /// file or environment variable still wins.
    pub fn overrides(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Profile::Development => &[
                ("IS_DEBUG", "true"),
                ("APP_IDEMPOTENCY_KEY_VALIDITY_TIME_SECONDS", "15"),
                ("DB_HOST", "localhost"),
            ],
            Profile::Staging => &[("IS_DEBUG", "true")],
            Profile::Production => &[("IS_DEBUG", "false")],
        }
    }

    /// Whether loggers run at DEBUG verbosity.
    pub fn is_verbose(&self) -> bool {
        matches!(self, Profile::Development | Profile::Staging)
    }

    /// Share of traces forwarded to remote error reporting.
    pub fn traces_sample_rate(&self) -> f64 {
        match self {
            Profile::Development => 1.0,
            Profile::Staging => 0.5,
            Profile::Production => 0.1,
        }
    }

    /// Whether log sink write failures are reported instead of swallowed.
    pub fn reports_sink_errors(&self) -> bool {
        self.is_verbose()
    }

    /// Whether the server collaborator should reload on source changes.
    pub fn hot_reload(&self) -> bool {
        *self == Profile::Development
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Profile::Development),
            "staging" => Ok(Profile::Staging),
            "production" => Ok(Profile::Production),
            _ => Err(ConfigError::UnknownProfile(s.trim().to_string())),
        }
    }
}
