//! Language type: opaque language identifier.
//!
//! A `Language` carries no internal structure. Two languages are the same
//! language exactly when their codes are byte-for-byte equal, so `"en"` and
//! `"EN"` are different languages as far as field redirection is concerned.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Reserved key in fallback and required-language mappings that applies to
/// every language not listed explicitly.
pub const DEFAULT_KEY: &str = "default";

/// An opaque language identifier (e.g. "en", "pl").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    /// Create a language from its code.
    ///
    /// No validation is performed; whether a language is supported is decided
    /// by the `Translator` it is used with.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the language code (e.g., "en", "pl").
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Name of the shadow field holding `field` in this language.
    pub fn shadow_field(&self, field: &str) -> String {
        format!("{}_{}", field, self.0)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Language {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for Language {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl Borrow<str> for Language {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Language {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
