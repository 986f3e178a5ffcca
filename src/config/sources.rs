//! Raw settings layers: built-in defaults, settings file, environment.
//!
//! Every layer is a flat map of upper-cased keys to trimmed string values.
//! Typed parsing happens once, after the layers are merged.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::ConfigError;

/// Environment variable naming the settings file to load.
pub const SETTINGS_FILE_VAR: &str = "APP_SETTINGS_FILE";

/// Settings file read when [`SETTINGS_FILE_VAR`] is unset. Optional.
pub const DEFAULT_SETTINGS_FILE: &str = ".env";

/// Environment variable holding the profile selector.
pub const PROFILE_VAR: &str = "APP_ENV_STATE";

pub(crate) type Layer = BTreeMap<String, String>;

/// Built-in defaults shared by every profile.
///
/// Mandatory fields (`DB_USER`, `DB_PASSWORD`) and optional ones without a
/// default are absent.
const DEFAULTS: &[(&str, &str)] = &[
    ("APP_NAME", "boilerplate"),
    ("APP_ENV_STATE", "development"),
    ("APP_API_VERSION", "v1"),
    ("APP_CI_COMMIT_SHA", "development_commit_sha"),
    ("APP_IDEMPOTENCY_KEY_VALIDITY_TIME_SECONDS", "300"),
    ("APP_HTTP_HEADERS_CONTENT_TYPE_JSON", "application/json"),
    ("IS_DEBUG", "false"),
    ("SERVER_PROTOCOL", "http"),
    ("SERVER_HOST", "127.0.0.1"),
    ("SERVER_PORT", "50000"),
    ("DB_DRIVER", "postgresql"),
    ("DB_HOST", "localhost"),
    ("DB_PORT", "5432"),
    ("DB_DATABASE", "boilerplate"),
    ("DB_SCHEMA", "app_work_data"),
    ("HTTP_CLIENT_TIMEOUT_SECONDS", "120"),
    ("RETRY_STOP_AFTER_DELAY_SECONDS", "120"),
    ("RETRY_STOP_AFTER_ATTEMPT", "10"),
    ("RETRY_WAIT_FIXED_SECONDS", "5"),
    ("RETRY_WAIT_RANDOM_MIN_SECONDS", "0"),
    ("RETRY_WAIT_RANDOM_MAX_SECONDS", "5"),
    ("RANDOM_SEED", "42"),
];

pub(crate) fn defaults() -> Layer {
    layer_from_pairs(DEFAULTS.iter().copied())
}

/// Builds a layer, normalizing keys to upper case and trimming values.
///
/// Empty values are dropped, so they fall through to lower layers.
pub(crate) fn layer_from_pairs<I, K, V>(pairs: I) -> Layer
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .into_iter()
        .filter_map(|(k, v)| {
            let value = v.as_ref().trim();
            if value.is_empty() {
                return None;
            }
            Some((k.as_ref().trim().to_ascii_uppercase(), value.to_string()))
        })
        .collect()
}

/// Merges layers in ascending priority: later layers win.
pub(crate) fn merge(layers: &[&Layer]) -> Layer {
    let mut merged = Layer::new();
    for layer in layers {
        merged.extend(layer.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    merged
}

/// Reads a settings file into a layer.
///
/// `.yaml`/`.yml` files are a flat mapping of scalars; anything else is
/// read as a dotenv file. The process environment is never touched.
pub(crate) fn read_settings_file(path: &Path) -> Result<Layer, ConfigError> {
    let content = fs::read_to_string(path)?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        read_yaml(&content)
    } else {
        read_dotenv(&content)
    }
}

fn read_dotenv(content: &str) -> Result<Layer, ConfigError> {
    let pairs = dotenvy::from_read_iter(content.as_bytes()).collect::<Result<Vec<_>, _>>()?;
    Ok(layer_from_pairs(pairs))
}

fn read_yaml(content: &str) -> Result<Layer, ConfigError> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)?;

    let mapping = match value {
        serde_yaml::Value::Null => return Ok(Layer::new()),
        serde_yaml::Value::Mapping(mapping) => mapping,
        _ => {
            return Err(ConfigError::invalid(
                "settings file",
                "expected a mapping of setting names to values",
            ));
        }
    };

    let mut pairs = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let key = match key {
            serde_yaml::Value::String(key) => key,
            other => {
                return Err(ConfigError::invalid(
                    "settings file",
                    format!("setting names must be strings, got {:?}", other),
                ));
            }
        };
        let value = match value {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            serde_yaml::Value::Null => continue,
            _ => return Err(ConfigError::invalid(&key, "expected a scalar value")),
        };
        pairs.push((key, value));
    }

    Ok(layer_from_pairs(pairs))
}
