use crate::error::ConfigError;
use crate::i18n::{FallbackLanguages, Language};
use crate::translator::Translator;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TranslatorConfig {
    pub default_language: Language,
    pub languages: Vec<Language>,

    /// Defaults to `{"default": [default_language]}`
    #[serde(default)]
    pub fallback_languages: Option<FallbackLanguages>,
}

impl TranslatorConfig {
    pub fn from_env() -> Result<Self> {
        let default_language = std::env::var("TRANSLATION_DEFAULT_LANGUAGE")
            .unwrap_or_else(|_| "en".to_string());

        let languages: Vec<Language> = std::env::var("TRANSLATION_LANGUAGES")
            .context("TRANSLATION_LANGUAGES not set")?
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(Language::from)
            .collect();

        let fallback_languages = match std::env::var("TRANSLATION_FALLBACK_LANGUAGES") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                serde_json::from_str(&raw)
                    .context("TRANSLATION_FALLBACK_LANGUAGES is not a JSON object of language lists")?,
            ),
            _ => None,
        };

        Ok(Self {
            default_language: Language::from(default_language.trim()),
            languages,
            fallback_languages,
        })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read translator config at {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse translator config at {}", path.display()))
    }

    /// Build the translator these settings describe.
    pub fn build(self) -> Result<Translator, ConfigError> {
        match self.fallback_languages {
            Some(fallbacks) => {
                Translator::with_fallback_languages(self.default_language, self.languages, fallbacks)
            }
            None => Translator::new(self.default_language, self.languages),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn clear_env() {
        std::env::remove_var("TRANSLATION_DEFAULT_LANGUAGE");
        std::env::remove_var("TRANSLATION_LANGUAGES");
        std::env::remove_var("TRANSLATION_FALLBACK_LANGUAGES");
    }

    // ==================== Environment Tests ====================

    #[test]
    #[serial]
    fn test_from_env_minimal() {
        clear_env();
        std::env::set_var("TRANSLATION_LANGUAGES", "en, pl,fr");

        let config = TranslatorConfig::from_env().expect("Should load");
        assert_eq!(config.default_language.code(), "en");
        let codes: Vec<&str> = config.languages.iter().map(Language::code).collect();
        assert_eq!(codes, vec!["en", "pl", "fr"]);
        assert!(config.fallback_languages.is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_missing_languages() {
        clear_env();
        let result = TranslatorConfig::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("TRANSLATION_LANGUAGES"));
    }

    #[test]
    #[serial]
    fn test_from_env_with_fallbacks() {
        clear_env();
        std::env::set_var("TRANSLATION_DEFAULT_LANGUAGE", "pl");
        std::env::set_var("TRANSLATION_LANGUAGES", "en,pl");
        std::env::set_var("TRANSLATION_FALLBACK_LANGUAGES", r#"{"default": ["pl"]}"#);

        let translator = TranslatorConfig::from_env()
            .expect("Should load")
            .build()
            .expect("Should build");
        assert_eq!(translator.default_language().code(), "pl");
        assert_eq!(
            translator.fallback_languages().chain(&Language::new("en")),
            [Language::new("pl")].as_slice()
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_fallback_json() {
        clear_env();
        std::env::set_var("TRANSLATION_LANGUAGES", "en,pl");
        std::env::set_var("TRANSLATION_FALLBACK_LANGUAGES", "not json");

        assert!(TranslatorConfig::from_env().is_err());

        clear_env();
    }

    // ==================== File Tests ====================

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{
                "default_language": "en",
                "languages": ["en", "pl", "fr"],
                "fallback_languages": {{"pl": ["en", "fr"], "fr": ["pl", "en"], "default": ["pl"]}}
            }}"#
        )
        .expect("write config");

        let config = TranslatorConfig::from_json_file(file.path()).expect("Should load");
        let translator = config.build().expect("Should build");
        assert_eq!(translator.languages().len(), 3);
        assert_eq!(
            translator.fallback_languages().chain(&Language::new("fr")),
            [Language::new("pl"), Language::new("en")].as_slice()
        );
    }

    #[test]
    fn test_from_json_file_missing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = TranslatorConfig::from_json_file(dir.path().join("missing.json"));
        assert!(result.unwrap_err().to_string().contains("Failed to read"));
    }

    #[test]
    fn test_build_rejects_invalid_settings() {
        let config = TranslatorConfig {
            default_language: Language::new("de"),
            languages: vec![Language::new("en")],
            fallback_languages: None,
        };
        assert_eq!(
            config.build().unwrap_err(),
            ConfigError::UnsupportedDefaultLanguage("de".to_string())
        );
    }
}
