//! Secret-typed setting values.

use serde::{Serialize, Serializer};
use std::fmt;

/// Placeholder rendered wherever a secret would otherwise be displayed.
pub const SECRET_PLACEHOLDER: &str = "**********";

/// A credential or token that never renders its raw value.
///
/// `Debug`, `Display` and `Serialize` all produce [`SECRET_PLACEHOLDER`]
/// regardless of the content. The raw value is reachable only through
/// [`SecretString::expose_secret`].
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString {
    inner: String,
}

impl SecretString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            inner: secret.into(),
        }
    }

    /// Returns the raw secret value.
    pub fn expose_secret(&self) -> &str {
        &self.inner
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString({})", SECRET_PLACEHOLDER)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(SECRET_PLACEHOLDER)
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(SECRET_PLACEHOLDER)
    }
}

impl From<String> for SecretString {
    fn from(secret: String) -> Self {
        Self::new(secret)
    }
}

impl From<&str> for SecretString {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}
