//! Translator: supported languages, fallback defaults and model registration.

use crate::error::ConfigError;
use crate::i18n::{FallbackLanguages, Language, LocaleContext, ResolutionMetrics};
use crate::resolver::FieldResolver;
use crate::schema::{
    derive_shadow_fields, validate, AugmentedSchema, RecordSchema, ShadowField,
    TranslationOptions, ValidatedSchema,
};
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

/// Global translation settings plus the active-language context.
///
/// A translator is usually built once at startup, shared (e.g. behind an
/// `Arc`) and used to register every translatable record type before any
/// record of that type is touched.
#[derive(Debug)]
pub struct Translator {
    default_language: Language,
    languages: Vec<Language>,
    fallback_languages: FallbackLanguages,
    locale: LocaleContext,
    metrics: ResolutionMetrics,
    registered: Mutex<BTreeSet<String>>,
}

impl Translator {
    /// Create a translator whose fallback for every language is the default language.
    pub fn new<L, I>(default_language: impl Into<Language>, languages: I) -> Result<Self, ConfigError>
    where
        L: Into<Language>,
        I: IntoIterator<Item = L>,
    {
        let default_language = default_language.into();
        let fallback_languages = FallbackLanguages::to_default_language(&default_language);
        Self::with_fallback_languages(default_language, languages, fallback_languages)
    }

    /// Create a translator with explicit fallback chains.
    ///
    /// The mapping must have a `"default"` entry, may not let a language fall
    /// back to itself and may only name supported languages.
    pub fn with_fallback_languages<L, I>(
        default_language: impl Into<Language>,
        languages: I,
        fallback_languages: FallbackLanguages,
    ) -> Result<Self, ConfigError>
    where
        L: Into<Language>,
        I: IntoIterator<Item = L>,
    {
        let default_language = default_language.into();

        let mut supported: Vec<Language> = Vec::new();
        for language in languages.into_iter().map(Into::into) {
            if !supported.contains(&language) {
                supported.push(language);
            }
        }

        if supported.is_empty() {
            return Err(ConfigError::NoLanguages);
        }
        if !supported.contains(&default_language) {
            return Err(ConfigError::UnsupportedDefaultLanguage(
                default_language.code().to_string(),
            ));
        }
        fallback_languages.validate(&supported, true)?;

        Ok(Self {
            locale: LocaleContext::new(default_language.clone()),
            default_language,
            languages: supported,
            fallback_languages,
            metrics: ResolutionMetrics::new(),
            registered: Mutex::new(BTreeSet::new()),
        })
    }

    pub fn default_language(&self) -> &Language {
        &self.default_language
    }

    /// Supported languages, in declaration order.
    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// Whether `code` names a supported language.
    ///
    /// Transport layers use this to filter a requested language before
    /// calling [`Translator::set_active_language`].
    pub fn is_supported(&self, code: &str) -> bool {
        self.languages.iter().any(|lang| lang.code() == code)
    }

    pub fn fallback_languages(&self) -> &FallbackLanguages {
        &self.fallback_languages
    }

    pub fn locale(&self) -> &LocaleContext {
        &self.locale
    }

    pub fn get_active_language(&self) -> Language {
        self.locale.get_active()
    }

    pub fn set_active_language(&self, language: impl Into<Language>) {
        self.locale.set_active(language);
    }

    /// Run `future` as its own flow with `language` active.
    ///
    /// On a `tokio` runtime this is how a request handler gets its language;
    /// see [`LocaleContext::scope_with`].
    pub fn with_active_language<F: Future>(
        &self,
        language: impl Into<Language>,
        future: F,
    ) -> impl Future<Output = F::Output> {
        self.locale.scope_with(language, future)
    }

    pub fn metrics(&self) -> &ResolutionMetrics {
        &self.metrics
    }

    pub fn is_registered(&self, model: &str) -> bool {
        self.registry().contains(model)
    }

    /// Register a record type for translation.
    ///
    /// Validates `options`, derives the shadow fields and returns the
    /// registered model. Each model name can be registered once; on error
    /// nothing is recorded.
    pub fn register(
        &self,
        record: RecordSchema,
        options: TranslationOptions,
    ) -> Result<TranslatedModel, ConfigError> {
        let mut registered = self.registry();
        if registered.contains(record.name()) {
            warn!("Model '{}' is already registered", record.name());
            return Err(ConfigError::AlreadyRegistered(record.name().to_string()));
        }

        let schema = validate(&record, options, self).map_err(|e| {
            warn!("Failed to register model '{}': {}", record.name(), e);
            e
        })?;
        let shadow_fields = derive_shadow_fields(&schema);
        let augmented = AugmentedSchema::apply(&record, &shadow_fields);

        registered.insert(record.name().to_string());
        info!(
            "Registered model '{}' with {} shadow fields",
            record.name(),
            shadow_fields.len()
        );

        Ok(TranslatedModel {
            owner: self.locale.id(),
            schema,
            shadow_fields,
            augmented,
        })
    }

    /// Field resolver for `model` bound to this translator's active language.
    ///
    /// `model` must have been registered on this translator.
    pub fn resolver<'a>(&'a self, model: &'a TranslatedModel) -> FieldResolver<'a> {
        debug_assert_eq!(
            model.owner,
            self.locale.id(),
            "model '{}' was registered on a different translator",
            model.name()
        );
        FieldResolver::new(self, &model.schema)
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, BTreeSet<String>> {
        self.registered.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A registered record type: validated options plus its augmented layout.
#[derive(Debug, Clone)]
pub struct TranslatedModel {
    owner: u64,
    schema: ValidatedSchema,
    shadow_fields: Vec<ShadowField>,
    augmented: AugmentedSchema,
}

impl TranslatedModel {
    pub fn name(&self) -> &str {
        self.schema.model_name()
    }

    pub fn schema(&self) -> &ValidatedSchema {
        &self.schema
    }

    /// The augmentation plan the record store applied.
    pub fn shadow_fields(&self) -> &[ShadowField] {
        &self.shadow_fields
    }

    pub fn augmented_schema(&self) -> &AugmentedSchema {
        &self.augmented
    }

    pub fn is_translated(&self, field: &str) -> bool {
        self.schema.is_translated(field)
    }
}
