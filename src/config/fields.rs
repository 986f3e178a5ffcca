//! Typed, validated reads from a merged settings layer.

use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use super::duration::parse_duration;
use super::sources::Layer;
use super::{ConfigError, SecretString};

/// Read-only view over merged settings values.
pub(crate) struct Fields<'a> {
    values: &'a Layer,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(values: &'a Layer) -> Self {
        Self { values }
    }

    pub(crate) fn raw(&self, key: &str) -> Option<&'a str> {
        self.values.get(key).map(|v| v.as_str())
    }

    fn required(&self, key: &str) -> Result<&'a str, ConfigError> {
        self.raw(key).ok_or_else(|| ConfigError::missing(key))
    }

    /// A mandatory non-empty string.
    pub(crate) fn string(&self, key: &str) -> Result<String, ConfigError> {
        self.required(key).map(str::to_string)
    }

    /// A string that may legitimately be empty.
    pub(crate) fn string_or_empty(&self, key: &str) -> String {
        self.raw(key).unwrap_or_default().to_string()
    }

    pub(crate) fn secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        self.required(key).map(SecretString::new)
    }

    pub(crate) fn optional_secret(&self, key: &str) -> Option<SecretString> {
        self.raw(key).map(SecretString::new)
    }

    pub(crate) fn parse<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.required(key)?;
        raw.parse::<T>()
            .map_err(|e| ConfigError::invalid(key, format!("'{}': {}", raw, e)))
    }

    /// A strictly positive integer.
    pub(crate) fn positive_u32(&self, key: &str) -> Result<u32, ConfigError> {
        let value: u32 = self.parse(key)?;
        if value == 0 {
            return Err(ConfigError::invalid(key, "must be greater than 0"));
        }
        Ok(value)
    }

    pub(crate) fn port_in(&self, key: &str, range: RangeInclusive<u16>) -> Result<u16, ConfigError> {
        let port: u16 = self.parse(key)?;
        if !range.contains(&port) {
            return Err(ConfigError::invalid(
                key,
                format!(
                    "{} is outside the allowed range {}..={}",
                    port,
                    range.start(),
                    range.end()
                ),
            ));
        }
        Ok(port)
    }

    pub(crate) fn bool(&self, key: &str) -> Result<bool, ConfigError> {
        let raw = self.required(key)?;
        match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::invalid(key, format!("'{}' is not a boolean", raw))),
        }
    }

    pub(crate) fn duration(&self, key: &str) -> Result<Duration, ConfigError> {
        let raw = self.required(key)?;
        parse_duration(raw).map_err(|e| ConfigError::invalid(key, e))
    }

    pub(crate) fn positive_duration(&self, key: &str) -> Result<Duration, ConfigError> {
        let value = self.duration(key)?;
        if value.is_zero() {
            return Err(ConfigError::invalid(key, "must be greater than 0"));
        }
        Ok(value)
    }

    /// A mandatory string restricted to a fixed set of values.
    pub(crate) fn one_of(&self, key: &str, allowed: &[&str]) -> Result<String, ConfigError> {
        let raw = self.required(key)?;
        if !allowed.contains(&raw) {
            return Err(ConfigError::invalid(
                key,
                format!("'{}' must be one of: {}", raw, allowed.join(", ")),
            ));
        }
        Ok(raw.to_string())
    }

    /// An optional URL whose scheme must be one of `schemes`.
    pub(crate) fn optional_url(&self, key: &str, schemes: &[&str]) -> Result<Option<Url>, ConfigError> {
        let Some(raw) = self.raw(key) else {
            return Ok(None);
        };
        let url = Url::parse(raw).map_err(|e| ConfigError::invalid(key, e.to_string()))?;
        if !schemes.contains(&url.scheme()) {
            return Err(ConfigError::invalid(
                key,
                format!(
                    "scheme '{}' is not allowed (expected {})",
                    url.scheme(),
                    schemes.join(" or ")
                ),
            ));
        }
        Ok(Some(url))
    }
}
