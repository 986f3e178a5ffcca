//! Key/value metadata prepended to log messages.

use std::fmt;

use serde_json::Value;

use super::LoggerError;

/// A scalar context value.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Str(s) => f.write_str(s),
            ContextValue::Int(n) => write!(f, "{}", n),
            ContextValue::Float(n) => write!(f, "{}", n),
            ContextValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Str(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Str(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        ContextValue::Int(value)
    }
}

impl From<i32> for ContextValue {
    fn from(value: i32) -> Self {
        ContextValue::Int(value.into())
    }
}

impl From<u32> for ContextValue {
    fn from(value: u32) -> Self {
        ContextValue::Int(value.into())
    }
}

impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        ContextValue::Float(value)
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Bool(value)
    }
}

/// Ordered mapping of context keys to scalar values.
///
/// Inserting an existing key replaces its value in place, so rendering
/// order is first-insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    entries: Vec<(String, ContextValue)>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Context::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy of `self` with `overrides` applied; `overrides` wins on key
    /// collision.
    pub fn merged(&self, overrides: &Context) -> Context {
        let mut merged = self.clone();
        for (key, value) in overrides.iter() {
            merged.insert(key, value.clone());
        }
        merged
    }

    /// Renders every entry as `key: value | `.
    pub fn render_prefix(&self) -> String {
        self.iter()
            .map(|(key, value)| format!("{}: {} | ", key, value))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<ContextValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Context::new();
        for (key, value) in iter {
            context.insert(key, value);
        }
        context
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Context
where
    K: Into<String>,
    V: Into<ContextValue>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// The one conversion from untyped caller input.
///
/// Anything but a JSON object is rejected; nulls are dropped; nested
/// arrays and objects are rejected.
impl TryFrom<Value> for Context {
    type Error = LoggerError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let found = json_kind(&value);
        let Value::Object(map) = value else {
            return Err(LoggerError::ContextType { found });
        };

        let mut context = Context::new();
        for (key, value) in map {
            let value = match value {
                Value::Null => continue,
                Value::Bool(b) => ContextValue::Bool(b),
                Value::String(s) => ContextValue::Str(s),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => ContextValue::Int(i),
                    None => ContextValue::Float(n.as_f64().unwrap_or(f64::NAN)),
                },
                other => {
                    return Err(LoggerError::ContextValue {
                        key,
                        found: json_kind(&other),
                    });
                }
            };
            context.insert(key, value);
        }
        Ok(context)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
