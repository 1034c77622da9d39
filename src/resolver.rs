//! Field resolution: redirecting logical field access to shadow fields.
//!
//! Instance reads walk a fallback chain; instance writes and query-time
//! column references always target exactly one shadow field.

use crate::i18n::Language;
use crate::schema::ValidatedSchema;
use crate::store::{Assignment, Predicate, Record, Row};
use crate::translator::Translator;
use serde_json::Value;
use tracing::debug;

/// Resolves logical field access for one registered record type.
///
/// Obtained from [`Translator::resolver`]. Holds no state of its own, so a
/// resolver can be shared freely between concurrent flows; each call reads
/// the active language anew.
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<'a> {
    translator: &'a Translator,
    schema: &'a ValidatedSchema,
}

impl<'a> FieldResolver<'a> {
    pub(crate) fn new(translator: &'a Translator, schema: &'a ValidatedSchema) -> Self {
        Self { translator, schema }
    }

    pub fn schema(&self) -> &'a ValidatedSchema {
        self.schema
    }

    /// Read `field` in the active language, falling back as configured.
    ///
    /// Untranslated fields are read as stored.
    pub fn get(&self, record: &impl Record, field: &str) -> Value {
        self.get_in(record, field, &self.translator.get_active_language())
    }

    /// Read `field` as if `language` were active.
    pub fn get_in(&self, record: &impl Record, field: &str, language: &Language) -> Value {
        if !self.schema.is_translated(field) {
            return stored(record, field);
        }
        let metrics = self.translator.metrics();

        if self.schema.is_supported(language) {
            let value = record.read(&language.shadow_field(field));
            if !self.schema.is_null(field, value) {
                metrics.record_direct_hit();
                return value.cloned().unwrap_or(Value::Null);
            }
        }

        for fallback in self.schema.fallback_languages().candidates(language) {
            let value = record.read(&fallback.shadow_field(field));
            if !self.schema.is_null(field, value) {
                debug!(
                    "{}.{} has no '{}' value, using '{}'",
                    self.schema.model_name(),
                    field,
                    language,
                    fallback
                );
                metrics.record_fallback_hit();
                return value.cloned().unwrap_or(Value::Null);
            }
        }

        debug!(
            "{}.{} has no value for '{}' or its fallbacks, using static fallback",
            self.schema.model_name(),
            field,
            language
        );
        metrics.record_static_fallback();
        self.schema.fallback_value(field)
    }

    /// Write `field` in the active language.
    ///
    /// An unsupported active language writes the default language's shadow
    /// field instead. Untranslated fields are written as-is.
    pub fn set(&self, record: &mut impl Record, field: &str, value: Value) {
        self.set_in(record, field, value, &self.translator.get_active_language());
    }

    /// Write `field` as if `language` were active.
    pub fn set_in(&self, record: &mut impl Record, field: &str, value: Value, language: &Language) {
        if self.schema.is_translated(field) && !self.schema.is_supported(language) {
            debug!(
                "'{}' is not supported, writing {}.{} in '{}'",
                language,
                self.schema.model_name(),
                field,
                self.schema.default_language()
            );
            self.translator.metrics().record_redirected_write();
        }
        let column = self.target_column(field, language);
        record.write(&column, value);
    }

    /// Raw value of the default language's shadow field, without fallback.
    pub fn get_default_language_shadow(&self, record: &impl Record, field: &str) -> Value {
        stored(record, &self.schema.default_language().shadow_field(field))
    }

    /// Build a record from `(name, value)` pairs.
    ///
    /// Logical fields are redirected first, then every other name (shadow
    /// fields included) is written verbatim, so an explicit `title_en` wins
    /// over `title` while English is active.
    pub fn construct<S, I>(&self, values: I) -> Row
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, Value)>,
    {
        let language = self.translator.get_active_language();
        let (logical, explicit): (Vec<_>, Vec<_>) = values
            .into_iter()
            .partition(|(name, _)| self.schema.is_translated(name.as_ref()));

        let mut row = Row::new();
        for (name, value) in logical {
            self.set_in(&mut row, name.as_ref(), value, &language);
        }
        for (name, value) in explicit {
            row.write(name.as_ref(), value);
        }
        row
    }

    // ==================== Query-time Redirection ====================

    /// Concrete column for `field` in the active language.
    ///
    /// No fallback: a query targets exactly one shadow column per evaluation.
    pub fn column(&self, field: &str) -> String {
        self.target_column(field, &self.translator.get_active_language())
    }

    /// `field = value` against the active language's column.
    pub fn predicate_eq(&self, field: &str, value: Value) -> Predicate {
        Predicate::eq(self.column(field), value)
    }

    /// `field IS NULL` against the active language's column.
    pub fn predicate_is_null(&self, field: &str) -> Predicate {
        Predicate::IsNull(self.column(field))
    }

    /// `SET field = value` against the active language's column.
    pub fn assignment(&self, field: &str, value: Value) -> Assignment {
        Assignment::new(self.column(field), value)
    }

    fn target_column(&self, field: &str, language: &Language) -> String {
        if !self.schema.is_translated(field) {
            return field.to_string();
        }
        if self.schema.is_supported(language) {
            return language.shadow_field(field);
        }
        self.schema.default_language().shadow_field(field)
    }
}

fn stored(record: &impl Record, column: &str) -> Value {
    record.read(column).cloned().unwrap_or(Value::Null)
}
