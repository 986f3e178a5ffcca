//! Validated request metadata carried into log context.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;
use url::Url;
use uuid::Uuid;

use super::{Context, ContextValue, LoggerError};

/// Per-request metadata: idempotency key, background task id and callback.
///
/// Every field is optional; present fields are validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Version 4 UUID sent in the `idempotency-key` header.
    #[serde(default)]
    pub idempotency_key: Option<Uuid>,
    /// Id of the asynchronous task handling the request.
    #[serde(default)]
    pub task_id: Option<NonZeroU64>,
    /// Where the task result is delivered.
    #[serde(default)]
    pub callback_url: Option<Url>,
}

impl Metadata {
    /// Parses and validates metadata from JSON.
    pub fn from_json(value: serde_json::Value) -> Result<Self, LoggerError> {
        let metadata: Metadata =
            serde_json::from_value(value).map_err(|e| LoggerError::Metadata(e.to_string()))?;
        metadata.validate()?;
        Ok(metadata)
    }

    pub fn validate(&self) -> Result<(), LoggerError> {
        if let Some(key) = &self.idempotency_key {
            if key.get_version_num() != 4 {
                return Err(LoggerError::Metadata(format!(
                    "idempotency_key {} is not a v4 UUID",
                    key
                )));
            }
        }
        if let Some(url) = &self.callback_url {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(LoggerError::Metadata(format!(
                    "callback_url scheme '{}' is not http or https",
                    url.scheme()
                )));
            }
        }
        Ok(())
    }
}

impl From<&Metadata> for Context {
    fn from(metadata: &Metadata) -> Self {
        let mut context = Context::new();
        if let Some(key) = &metadata.idempotency_key {
            context.insert("idempotency_key", key.to_string());
        }
        if let Some(task_id) = metadata.task_id {
            let value = match i64::try_from(task_id.get()) {
                Ok(id) => ContextValue::Int(id),
                Err(_) => ContextValue::Str(task_id.to_string()),
            };
            context.insert("task_id", value);
        }
        if let Some(url) = &metadata.callback_url {
            context.insert("callback_url", url.as_str());
        }
        context
    }
}
