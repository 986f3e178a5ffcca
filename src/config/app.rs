//! Application identity and API-level settings.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use std::time::Duration;

use super::fields::Fields;
use super::{duration, ConfigError, Profile, SecretString};

/// Application-level settings.
#[derive(Debug, Clone, Serialize)]
pub struct AppSettings {
    /// Application name used in logs and API metadata.
    pub name: String,
    /// Active environment profile.
    pub env: Profile,
    /// Path prefix when served behind a proxy.
    pub root_path: String,
    /// API version tag, e.g. "v1".
    pub api_version: String,
    /// Bearer token guarding the admin endpoints.
    pub api_access_token: Option<SecretString>,
    /// Git commit the build was made from.
    pub commit_sha: String,
    /// How long an idempotency key stays valid after the first request.
    #[serde(serialize_with = "duration::serialize")]
    pub idempotency_key_validity: Duration,
    /// Value of the JSON `Content-Type` header.
    pub content_type_json: String,
    /// Debug mode; defaults per profile.
    pub is_debug: bool,
}

impl AppSettings {
    pub(crate) fn from_fields(env: Profile, fields: &Fields<'_>) -> Result<Self, ConfigError> {
        let api_version = fields.string("APP_API_VERSION")?;
        if !is_api_version(&api_version) {
            return Err(ConfigError::invalid(
                "APP_API_VERSION",
                format!("'{}' must look like v1, v12, v123", api_version),
            ));
        }

        Ok(AppSettings {
            name: fields.string("APP_NAME")?,
            env,
            root_path: fields.string_or_empty("APP_ROOT_PATH"),
            api_version,
            api_access_token: fields.optional_secret("APP_API_ACCESS_HTTP_BEARER_TOKEN"),
            commit_sha: fields.string("APP_CI_COMMIT_SHA")?,
            idempotency_key_validity: fields
                .positive_duration("APP_IDEMPOTENCY_KEY_VALIDITY_TIME_SECONDS")?,
            content_type_json: fields.string("APP_HTTP_HEADERS_CONTENT_TYPE_JSON")?,
            is_debug: fields.bool("IS_DEBUG")?,
        })
    }
}

static API_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d+$").expect("API version pattern is valid"));

fn is_api_version(s: &str) -> bool {
    API_VERSION.is_match(s)
}
