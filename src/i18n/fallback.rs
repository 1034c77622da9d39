//! Fallback chains: which languages to consult when a translation is missing.
//!
//! A `FallbackLanguages` map goes from a language key to an ordered list of
//! fallback languages. The reserved `"default"` key applies to every language
//! without an entry of its own, including supported languages that are simply
//! not mentioned.

use crate::error::ConfigError;
use crate::i18n::language::{Language, DEFAULT_KEY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from language key (or `"default"`) to an ordered fallback chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FallbackLanguages {
    chains: BTreeMap<String, Vec<Language>>,
}

impl FallbackLanguages {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// The translator-level default: every language falls back to `default_language`.
    pub fn to_default_language(default_language: &Language) -> Self {
        Self::new().with_default([default_language.clone()])
    }

    /// Set the fallback chain for one language.
    pub fn with<L, I>(mut self, language: impl Into<String>, chain: I) -> Self
    where
        L: Into<Language>,
        I: IntoIterator<Item = L>,
    {
        self.chains
            .insert(language.into(), chain.into_iter().map(Into::into).collect());
        self
    }

    /// Set the chain used by every language without an explicit entry.
    pub fn with_default<L, I>(self, chain: I) -> Self
    where
        L: Into<Language>,
        I: IntoIterator<Item = L>,
    {
        self.with(DEFAULT_KEY, chain)
    }

    /// Whether a `"default"` entry is present.
    pub fn has_default(&self) -> bool {
        self.chains.contains_key(DEFAULT_KEY)
    }

    /// The declared chain for `language`: its own entry, else the `"default"`
    /// entry, else nothing.
    pub fn chain(&self, language: &Language) -> &[Language] {
        self.chains
            .get(language.code())
            .or_else(|| self.chains.get(DEFAULT_KEY))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Languages to try, in order, after `language` itself came up empty.
    ///
    /// Skips `language` and repeated entries, so the walk never visits a
    /// language twice.
    pub fn candidates<'a>(&'a self, language: &'a Language) -> impl Iterator<Item = &'a Language> + 'a {
        let mut seen: Vec<&Language> = Vec::new();
        self.chain(language).iter().filter(move |candidate| {
            if *candidate == language || seen.contains(candidate) {
                return false;
            }
            seen.push(*candidate);
            true
        })
    }

    /// Check the mapping against the supported languages.
    ///
    /// With `require_default`, a missing `"default"` entry is an error even if
    /// every supported language has its own entry.
    pub fn validate(&self, languages: &[Language], require_default: bool) -> Result<(), ConfigError> {
        if !self.has_default() {
            if require_default {
                return Err(ConfigError::EmptyFallbackChain {
                    language: DEFAULT_KEY.to_string(),
                });
            }
            if let Some(unlisted) = languages
                .iter()
                .find(|lang| !self.chains.contains_key(lang.code()))
            {
                return Err(ConfigError::EmptyFallbackChain {
                    language: unlisted.code().to_string(),
                });
            }
        }

        for (key, chain) in &self.chains {
            for fallback in chain {
                if key != DEFAULT_KEY && fallback.code() == key {
                    return Err(ConfigError::SelfFallback(key.clone()));
                }
                if !languages.contains(fallback) {
                    return Err(ConfigError::UnsupportedFallbackLanguage {
                        key: key.clone(),
                        language: fallback.code().to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
