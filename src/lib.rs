//! Translatable record fields.
//!
//! A record type registers some of its fields as translatable. Registration
//! derives one shadow field per `(field, language)` pair (`title_en`,
//! `title_pl`, ...), and a [`FieldResolver`] then redirects every access to
//! the logical field (`title`) to the shadow field of the active language,
//! walking a configurable fallback chain on read.
//!
//! ```rust
//! use model_translation::{FieldType, RecordSchema, Row, TranslationOptions, Translator};
//! use serde_json::json;
//!
//! let translator = Translator::new("en", ["en", "pl"])?;
//! let book = translator.register(
//!     RecordSchema::new("Book").field("title", FieldType::Text),
//!     TranslationOptions::new(["title"]),
//! )?;
//! let resolver = translator.resolver(&book);
//!
//! let mut row = Row::new();
//! resolver.set(&mut row, "title", json!("The Hobbit"));
//!
//! translator.set_active_language("pl");
//! assert_eq!(resolver.get(&row, "title"), json!("The Hobbit"));
//! # Ok::<(), model_translation::ConfigError>(())
//! ```

pub mod config;
pub mod error;
pub mod i18n;
pub mod resolver;
pub mod schema;
pub mod store;
pub mod translator;

pub use error::{ConfigError, StoreError};
pub use i18n::{FallbackLanguages, Language, LocaleContext};
pub use resolver::FieldResolver;
pub use schema::{
    derive_shadow_fields, validate, AugmentedSchema, FallbackValues, FieldType, RecordSchema,
    RequiredLanguages, ShadowField, TranslationOptions, ValidatedSchema,
};
pub use store::{Assignment, MemoryTable, Predicate, Record, Row};
pub use translator::{TranslatedModel, Translator};
