//! Error types.
//!
//! Configuration errors are raised while constructing a `Translator` or
//! registering a record type, never while reading or writing fields.

use thiserror::Error;

/// Configuration error raised at translator construction or registration time.
///
/// Every variant is fatal: the translator is not built, or the record type is
/// left unregistered with no partial augmentation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("translator must support at least one language")]
    NoLanguages,

    #[error("default language '{0}' is not one of the supported languages")]
    UnsupportedDefaultLanguage(String),

    #[error("model '{model}' declares no translatable fields")]
    NoTranslatableFields { model: String },

    #[error("model '{model}' has no scalar field named '{field}'")]
    UnknownField { model: String, field: String },

    #[error("fallback languages have no 'default' entry, so '{language}' has no fallback chain")]
    EmptyFallbackChain { language: String },

    #[error("language '{0}' lists itself as its own fallback")]
    SelfFallback(String),

    #[error("fallback chain for '{key}' names unsupported language '{language}'")]
    UnsupportedFallbackLanguage { key: String, language: String },

    #[error("required language '{0}' is not one of the supported languages")]
    UnsupportedRequiredLanguage(String),

    #[error("model '{0}' is already registered")]
    AlreadyRegistered(String),
}

/// Error raised by the in-memory record store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("column '{column}' of model '{model}' is not nullable")]
    MissingRequired { model: String, column: String },

    #[error("model '{model}' has no column '{column}'")]
    UnknownColumn { model: String, column: String },
}
