//! Record schemas and their translation augmentation.
//!
//! Registration is two-phase: [`validate`] checks a [`TranslationOptions`]
//! against a record schema and the translator's settings, then
//! [`derive_shadow_fields`] turns the result into the ordered list of
//! per-language columns the record store has to add. [`AugmentedSchema`] is
//! the finished column layout.

use crate::error::ConfigError;
use crate::i18n::{FallbackLanguages, Language, DEFAULT_KEY};
use crate::translator::Translator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

// ==================== Record Schema ====================

/// Storage type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Integer,
    Float,
    Boolean,
    Json,
}

impl FieldType {
    /// Whether fields of this type can be translated.
    pub fn is_scalar(self) -> bool {
        !matches!(self, FieldType::Json)
    }
}

/// A declared field of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    pub nullable: bool,
}

/// A record type: a name plus its declared fields, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    name: String,
    fields: Vec<FieldDef>,
}

impl RecordSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a non-nullable field.
    pub fn field(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.push(name.into(), field_type, false)
    }

    /// Add a nullable field.
    pub fn nullable_field(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.push(name.into(), field_type, true)
    }

    fn push(mut self, name: String, field_type: FieldType, nullable: bool) -> Self {
        self.fields.retain(|f| f.name != name);
        self.fields.push(FieldDef {
            name,
            field_type,
            nullable,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

// ==================== Translation Options ====================

/// Which shadow fields must be non-nullable.
///
/// A plain list marks every translated field as required in each listed
/// language. A mapping goes from language (or `"default"`) to the fields
/// required in that language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequiredLanguages {
    Languages(Vec<Language>),
    PerLanguage(BTreeMap<String, Vec<String>>),
}

impl RequiredLanguages {
    /// Exact language key, then `"default"`, then not required.
    pub fn is_required(&self, language: &Language, field: &str) -> bool {
        match self {
            RequiredLanguages::Languages(languages) => languages.contains(language),
            RequiredLanguages::PerLanguage(map) => map
                .get(language.code())
                .or_else(|| map.get(DEFAULT_KEY))
                .is_some_and(|fields| fields.iter().any(|f| f == field)),
        }
    }

    fn languages(&self) -> Vec<&str> {
        match self {
            RequiredLanguages::Languages(languages) => {
                languages.iter().map(Language::code).collect()
            }
            RequiredLanguages::PerLanguage(map) => map
                .keys()
                .map(String::as_str)
                .filter(|key| *key != DEFAULT_KEY)
                .collect(),
        }
    }

    fn fields(&self) -> Vec<&str> {
        match self {
            RequiredLanguages::Languages(_) => Vec::new(),
            RequiredLanguages::PerLanguage(map) => {
                map.values().flatten().map(String::as_str).collect()
            }
        }
    }
}

/// Value returned when no language in the chain has a translation.
///
/// A JSON object is read as a per-field mapping; anything else applies to
/// every translated field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FallbackValues {
    PerField(BTreeMap<String, Value>),
    All(Value),
}

impl FallbackValues {
    pub fn value_for(&self, field: &str) -> Value {
        match self {
            FallbackValues::PerField(map) => map.get(field).cloned().unwrap_or(Value::Null),
            FallbackValues::All(value) => value.clone(),
        }
    }
}

/// Per record type translation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationOptions {
    pub fields: Vec<String>,

    #[serde(default)]
    pub required_languages: Option<RequiredLanguages>,

    /// Overrides the translator's fallback chains for this record type
    #[serde(default)]
    pub fallback_languages: Option<FallbackLanguages>,

    #[serde(default)]
    pub fallback_values: Option<FallbackValues>,

    /// Per-field sentinel that counts as "absent" instead of null
    #[serde(default)]
    pub fallback_undefined: BTreeMap<String, Value>,
}

impl TranslationOptions {
    pub fn new<S, I>(fields: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            required_languages: None,
            fallback_languages: None,
            fallback_values: None,
            fallback_undefined: BTreeMap::new(),
        }
    }

    /// Require every translated field in each of `languages`.
    pub fn required_languages<L, I>(mut self, languages: I) -> Self
    where
        L: Into<Language>,
        I: IntoIterator<Item = L>,
    {
        self.required_languages = Some(RequiredLanguages::Languages(
            languages.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn required_fields(mut self, required: BTreeMap<String, Vec<String>>) -> Self {
        self.required_languages = Some(RequiredLanguages::PerLanguage(required));
        self
    }

    pub fn fallback_languages(mut self, fallback_languages: FallbackLanguages) -> Self {
        self.fallback_languages = Some(fallback_languages);
        self
    }

    pub fn fallback_values(mut self, fallback_values: FallbackValues) -> Self {
        self.fallback_values = Some(fallback_values);
        self
    }

    pub fn fallback_undefined(mut self, field: impl Into<String>, sentinel: Value) -> Self {
        self.fallback_undefined.insert(field.into(), sentinel);
        self
    }
}

// ==================== Validation ====================

/// Translation options checked against a record schema and a translator.
#[derive(Debug, Clone)]
pub struct ValidatedSchema {
    record: RecordSchema,
    fields: Vec<String>,
    languages: Vec<Language>,
    default_language: Language,
    fallback_languages: FallbackLanguages,
    fallback_values: Option<FallbackValues>,
    fallback_undefined: BTreeMap<String, Value>,
    required: BTreeSet<(String, Language)>,
}

impl ValidatedSchema {
    pub fn record(&self) -> &RecordSchema {
        &self.record
    }

    pub fn model_name(&self) -> &str {
        self.record.name()
    }

    /// Translated logical fields, in declaration order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_translated(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn is_supported(&self, language: &Language) -> bool {
        self.languages.contains(language)
    }

    pub fn default_language(&self) -> &Language {
        &self.default_language
    }

    /// Effective fallback chains: the options' own, else the translator's.
    pub fn fallback_languages(&self) -> &FallbackLanguages {
        &self.fallback_languages
    }

    /// Whether the `(field, language)` shadow field is non-nullable.
    pub fn is_required(&self, field: &str, language: &Language) -> bool {
        self.required
            .contains(&(field.to_string(), language.clone()))
    }

    /// Null test: the field's sentinel when one is configured, else storage-null.
    pub fn is_null(&self, field: &str, value: Option<&Value>) -> bool {
        let value = value.unwrap_or(&Value::Null);
        match self.fallback_undefined.get(field) {
            Some(sentinel) => value == sentinel,
            None => value.is_null(),
        }
    }

    /// Static value returned when the fallback chain yields nothing.
    pub fn fallback_value(&self, field: &str) -> Value {
        self.fallback_values
            .as_ref()
            .map(|values| values.value_for(field))
            .unwrap_or(Value::Null)
    }
}

/// Validate `options` for `record` against the translator's settings.
pub fn validate(
    record: &RecordSchema,
    options: TranslationOptions,
    translator: &Translator,
) -> Result<ValidatedSchema, ConfigError> {
    let model = record.name().to_string();
    let unknown_field = |field: &str| ConfigError::UnknownField {
        model: model.clone(),
        field: field.to_string(),
    };

    let mut fields: Vec<String> = Vec::new();
    for field in options.fields {
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    if fields.is_empty() {
        return Err(ConfigError::NoTranslatableFields {
            model: model.clone(),
        });
    }
    for field in &fields {
        match record.get(field) {
            Some(def) if def.field_type.is_scalar() => {}
            _ => return Err(unknown_field(field.as_str())),
        }
    }

    let languages = translator.languages().to_vec();
    let fallback_languages = match options.fallback_languages {
        Some(own) => {
            own.validate(&languages, false)?;
            own
        }
        None => translator.fallback_languages().clone(),
    };

    let mut required = BTreeSet::new();
    if let Some(spec) = &options.required_languages {
        if let Some(unsupported) = spec
            .languages()
            .into_iter()
            .find(|code| !languages.iter().any(|l| l.code() == *code))
        {
            return Err(ConfigError::UnsupportedRequiredLanguage(unsupported.to_string()));
        }
        if let Some(field) = spec
            .fields()
            .into_iter()
            .find(|f| !fields.iter().any(|t| t.as_str() == *f))
        {
            return Err(unknown_field(field));
        }
        for field in &fields {
            let originally_required = record.get(field).is_some_and(|def| !def.nullable);
            for language in &languages {
                if originally_required && spec.is_required(language, field) {
                    required.insert((field.clone(), language.clone()));
                }
            }
        }
    }

    if let Some(field) = options
        .fallback_undefined
        .keys()
        .find(|f| !fields.contains(*f))
    {
        return Err(unknown_field(field.as_str()));
    }
    if let Some(FallbackValues::PerField(map)) = &options.fallback_values {
        if let Some(field) = map.keys().find(|f| !fields.contains(*f)) {
            return Err(unknown_field(field.as_str()));
        }
    }

    Ok(ValidatedSchema {
        record: record.clone(),
        fields,
        languages,
        default_language: translator.default_language().clone(),
        fallback_languages,
        fallback_values: options.fallback_values,
        fallback_undefined: options.fallback_undefined,
        required,
    })
}

// ==================== Augmentation Plan ====================

/// One derived per-language column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShadowField {
    /// Logical field this column shadows
    pub field: String,
    pub language: Language,
    /// Column name (`{field}_{language}`)
    pub column: String,
    /// Storage type, inherited from the logical field
    pub field_type: FieldType,
    pub required: bool,
}

/// The augmentation plan: one shadow field per `(field, language)`, fields in
/// declaration order and languages in translator order.
pub fn derive_shadow_fields(schema: &ValidatedSchema) -> Vec<ShadowField> {
    let mut plan = Vec::with_capacity(schema.fields().len() * schema.languages().len());
    for field in schema.fields() {
        let Some(def) = schema.record().get(field) else {
            continue;
        };
        for language in schema.languages() {
            plan.push(ShadowField {
                field: field.clone(),
                language: language.clone(),
                column: language.shadow_field(field),
                field_type: def.field_type,
                required: schema.is_required(field, language),
            });
        }
    }
    plan
}

/// Role of a column in an augmented schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnKind {
    /// Untranslated field, stored as declared
    Plain,
    /// Translated logical field; a virtual accessor with no storage of its own
    Logical,
    Shadow { field: String, language: Language },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub field_type: FieldType,
    pub nullable: bool,
    pub kind: ColumnKind,
}

impl Column {
    /// Whether the column is backed by storage.
    pub fn is_stored(&self) -> bool {
        !matches!(self.kind, ColumnKind::Logical)
    }
}

/// Final column layout of a registered record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AugmentedSchema {
    name: String,
    columns: Vec<Column>,
}

impl AugmentedSchema {
    /// Apply an augmentation plan to the original record schema.
    pub fn apply(record: &RecordSchema, plan: &[ShadowField]) -> Self {
        let mut columns: Vec<Column> = record
            .fields()
            .iter()
            .map(|def| {
                let logical = plan.iter().any(|shadow| shadow.field == def.name);
                Column {
                    name: def.name.clone(),
                    field_type: def.field_type,
                    nullable: def.nullable || logical,
                    kind: if logical {
                        ColumnKind::Logical
                    } else {
                        ColumnKind::Plain
                    },
                }
            })
            .collect();

        columns.extend(plan.iter().map(|shadow| Column {
            name: shadow.column.clone(),
            field_type: shadow.field_type,
            nullable: !shadow.required,
            kind: ColumnKind::Shadow {
                field: shadow.field.clone(),
                language: shadow.language.clone(),
            },
        }));

        Self {
            name: record.name().to_string(),
            columns,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Storage-backed columns that may not hold null.
    pub fn required_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|c| c.is_stored() && !c.nullable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn book() -> RecordSchema {
        RecordSchema::new("Book")
            .nullable_field("id", FieldType::Integer)
            .field("title", FieldType::Text)
            .field("author", FieldType::Text)
    }

    fn translator() -> Translator {
        Translator::new("en", ["en", "pl"]).expect("valid translator")
    }

    fn validated(options: TranslationOptions) -> ValidatedSchema {
        validate(&book(), options, &translator()).expect("options should validate")
    }

    // ==================== Record Schema Tests ====================

    #[test]
    fn test_record_schema_builder() {
        let schema = book();
        assert_eq!(schema.name(), "Book");
        assert_eq!(schema.fields().len(), 3);
        assert!(schema.get("id").is_some_and(|f| f.nullable));
        assert!(schema.get("title").is_some_and(|f| !f.nullable));
        assert!(schema.get("isbn").is_none());
    }

    #[test]
    fn test_redeclaring_field_replaces_it() {
        let schema = RecordSchema::new("Book")
            .field("title", FieldType::Text)
            .nullable_field("title", FieldType::Text);
        assert_eq!(schema.fields().len(), 1);
        assert!(schema.fields()[0].nullable);
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_validate_minimal_options() {
        let schema = validated(TranslationOptions::new(["title"]));
        assert_eq!(schema.fields(), ["title".to_string()]);
        assert!(schema.is_translated("title"));
        assert!(!schema.is_translated("author"));
        assert!(!schema.is_required("title", &Language::new("en")));
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let result = validate(&book(), TranslationOptions::new(Vec::<String>::new()), &translator());
        assert_eq!(
            result.unwrap_err(),
            ConfigError::NoTranslatableFields {
                model: "Book".to_string()
            }
        );
    }

    #[test]
    fn test_validate_rejects_unknown_field() {
        let result = validate(&book(), TranslationOptions::new(["subtitle"]), &translator());
        assert_eq!(
            result.unwrap_err(),
            ConfigError::UnknownField {
                model: "Book".to_string(),
                field: "subtitle".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_rejects_non_scalar_field() {
        let record = book().field("metadata", FieldType::Json);
        let result = validate(&record, TranslationOptions::new(["metadata"]), &translator());
        assert!(matches!(result, Err(ConfigError::UnknownField { .. })));
    }

    #[test]
    fn test_validate_rejects_unsupported_required_language() {
        let options = TranslationOptions::new(["title"]).required_languages(["fr"]);
        let result = validate(&book(), options, &translator());
        assert_eq!(
            result.unwrap_err(),
            ConfigError::UnsupportedRequiredLanguage("fr".to_string())
        );
    }

    #[test]
    fn test_validate_rejects_required_mapping_for_untranslated_field() {
        let required = BTreeMap::from([("en".to_string(), vec!["author".to_string()])]);
        let options = TranslationOptions::new(["title"]).required_fields(required);
        let result = validate(&book(), options, &translator());
        assert!(matches!(result, Err(ConfigError::UnknownField { field, .. }) if field == "author"));
    }

    #[test]
    fn test_validate_rejects_options_fallback_without_default() {
        let options = TranslationOptions::new(["title"])
            .fallback_languages(FallbackLanguages::new().with("pl", ["en"]));
        let result = validate(&book(), options, &translator());
        assert_eq!(
            result.unwrap_err(),
            ConfigError::EmptyFallbackChain {
                language: "en".to_string()
            }
        );
    }

    #[test]
    fn test_validate_accepts_options_fallback_listing_every_language() {
        let options = TranslationOptions::new(["title"])
            .fallback_languages(FallbackLanguages::new().with("pl", ["en"]).with("en", ["pl"]));
        let schema = validated(options);
        assert!(!schema.fallback_languages().has_default());
    }

    #[test]
    fn test_validate_rejects_options_self_fallback() {
        let options = TranslationOptions::new(["title"])
            .fallback_languages(FallbackLanguages::new().with("pl", ["pl"]).with_default(["en"]));
        let result = validate(&book(), options, &translator());
        assert_eq!(result.unwrap_err(), ConfigError::SelfFallback("pl".to_string()));
    }

    #[test]
    fn test_validate_rejects_sentinel_for_untranslated_field() {
        let options = TranslationOptions::new(["title"]).fallback_undefined("author", json!(""));
        let result = validate(&book(), options, &translator());
        assert!(matches!(result, Err(ConfigError::UnknownField { .. })));
    }

    #[test]
    fn test_validate_inherits_translator_fallbacks() {
        let schema = validated(TranslationOptions::new(["title"]));
        assert_eq!(
            schema.fallback_languages().chain(&Language::new("pl")),
            [Language::new("en")].as_slice()
        );
    }

    // ==================== Required Language Tests ====================

    #[test]
    fn test_required_language_list() {
        let schema = validated(TranslationOptions::new(["title"]).required_languages(["en"]));
        assert!(schema.is_required("title", &Language::new("en")));
        assert!(!schema.is_required("title", &Language::new("pl")));
    }

    #[test]
    fn test_required_mapping_uses_default_key() {
        let required = BTreeMap::from([
            ("pl".to_string(), Vec::new()),
            ("default".to_string(), vec!["title".to_string()]),
        ]);
        let record = book();
        let options = TranslationOptions::new(["title", "author"]).required_fields(required);
        let schema = validate(&record, options, &translator()).expect("valid");
        assert!(schema.is_required("title", &Language::new("en")));
        assert!(!schema.is_required("author", &Language::new("en")));
        assert!(!schema.is_required("title", &Language::new("pl")));
    }

    #[test]
    fn test_optional_original_field_is_never_required() {
        let record = RecordSchema::new("Book").nullable_field("title", FieldType::Text);
        let options = TranslationOptions::new(["title"]).required_languages(["en"]);
        let schema = validate(&record, options, &translator()).expect("valid");
        assert!(!schema.is_required("title", &Language::new("en")));
    }

    #[test]
    fn test_required_languages_deserialize_both_shapes() {
        let list: RequiredLanguages = serde_json::from_value(json!(["en"])).expect("list");
        assert!(list.is_required(&Language::new("en"), "anything"));

        let map: RequiredLanguages =
            serde_json::from_value(json!({"default": ["title"]})).expect("map");
        assert!(map.is_required(&Language::new("fr"), "title"));
        assert!(!map.is_required(&Language::new("fr"), "author"));
    }

    // ==================== Null Test and Fallback Value Tests ====================

    #[test]
    fn test_is_null_without_sentinel() {
        let schema = validated(TranslationOptions::new(["title"]));
        assert!(schema.is_null("title", None));
        assert!(schema.is_null("title", Some(&Value::Null)));
        assert!(!schema.is_null("title", Some(&json!(""))));
    }

    #[test]
    fn test_is_null_with_sentinel_replaces_null_check() {
        let schema = validated(TranslationOptions::new(["title"]).fallback_undefined("title", json!("")));
        assert!(schema.is_null("title", Some(&json!(""))));
        assert!(!schema.is_null("title", Some(&json!("Hobbit"))));
        assert!(!schema.is_null("title", Some(&Value::Null)));
    }

    #[test]
    fn test_fallback_value_defaults_to_null() {
        let schema = validated(TranslationOptions::new(["title"]));
        assert_eq!(schema.fallback_value("title"), Value::Null);
    }

    #[test]
    fn test_fallback_value_single_value() {
        let schema = validated(
            TranslationOptions::new(["title", "author"])
                .fallback_values(FallbackValues::All(json!("n/a"))),
        );
        assert_eq!(schema.fallback_value("title"), json!("n/a"));
        assert_eq!(schema.fallback_value("author"), json!("n/a"));
    }

    #[test]
    fn test_fallback_value_per_field() {
        let values = BTreeMap::from([("title".to_string(), json!("Untitled"))]);
        let schema = validated(
            TranslationOptions::new(["title", "author"])
                .fallback_values(FallbackValues::PerField(values)),
        );
        assert_eq!(schema.fallback_value("title"), json!("Untitled"));
        assert_eq!(schema.fallback_value("author"), Value::Null);
    }

    // ==================== Derivation Tests ====================

    #[test]
    fn test_derive_shadow_fields_order_and_types() {
        let schema = validated(TranslationOptions::new(["title", "author"]).required_languages(["en"]));
        let plan = derive_shadow_fields(&schema);
        let columns: Vec<&str> = plan.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(columns, vec!["title_en", "title_pl", "author_en", "author_pl"]);
        assert!(plan.iter().all(|s| s.field_type == FieldType::Text));
        assert!(plan[0].required);
        assert!(!plan[1].required);
    }

    #[test]
    fn test_augmented_schema_layout() {
        let schema = validated(TranslationOptions::new(["title"]).required_languages(["en"]));
        let augmented = AugmentedSchema::apply(schema.record(), &derive_shadow_fields(&schema));

        let title = augmented.column("title").expect("logical column");
        assert_eq!(title.kind, ColumnKind::Logical);
        assert!(title.nullable);
        assert!(!title.is_stored());

        let author = augmented.column("author").expect("plain column");
        assert_eq!(author.kind, ColumnKind::Plain);
        assert!(!author.nullable);

        let title_en = augmented.column("title_en").expect("shadow column");
        assert!(!title_en.nullable);
        assert!(augmented.column("title_pl").is_some_and(|c| c.nullable));

        let required: Vec<&str> = augmented.required_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(required, vec!["author", "title_en"]);
    }

    #[test]
    fn test_options_deserialize_from_json() {
        let options: TranslationOptions = serde_json::from_value(json!({
            "fields": ["title"],
            "required_languages": ["en"],
            "fallback_languages": {"default": ["en"]},
            "fallback_values": {"title": "Untitled"},
            "fallback_undefined": {"title": ""}
        }))
        .expect("Should deserialize");

        assert_eq!(options.fields, vec!["title".to_string()]);
        assert!(matches!(options.fallback_values, Some(FallbackValues::PerField(_))));
        assert_eq!(options.fallback_undefined.get("title"), Some(&json!("")));
    }
}
