use anyhow::Result;
use model_translation::config::TranslatorConfig;
use model_translation::{
    FallbackLanguages, FieldType, Language, MemoryTable, RecordSchema, TranslationOptions,
    Translator,
};
use serde_json::json;
use tracing::{info, warn};

fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("model_translation=info".parse()?),
        )
        .init();

    let translator = match TranslatorConfig::from_env() {
        Ok(config) => config.build()?,
        Err(e) => {
            warn!("{:#}, using built-in en/pl/fr settings", e);
            Translator::with_fallback_languages(
                "en",
                ["en", "pl", "fr"],
                FallbackLanguages::new()
                    .with("pl", ["en", "fr"])
                    .with("fr", ["pl", "en"])
                    .with_default(["pl"]),
            )?
        }
    };

    let languages: Vec<&str> = translator.languages().iter().map(Language::code).collect();
    info!(
        "Translator ready (default '{}', languages {:?})",
        translator.default_language(),
        languages
    );

    // Step 1: Register the Book model
    let book = translator.register(
        RecordSchema::new("Book")
            .nullable_field("id", FieldType::Integer)
            .field("title", FieldType::Text)
            .field("author", FieldType::Text),
        TranslationOptions::new(["title"]).required_languages([translator.default_language().clone()]),
    )?;
    let resolver = translator.resolver(&book);

    // Step 2: Seed books in the default language plus one extra translation each
    translator.set_active_language(translator.default_language().clone());
    let seeds = [
        ("The Hobbit", "J.R.R. Tolkien", None),
        ("1984", "George Orwell", Some(("title_pl", "Rok 1984"))),
        ("To Kill a Mockingbird", "Harper Lee", Some(("title_fr", "Ne tirez pas sur l'oiseau moqueur"))),
    ];

    let mut table = MemoryTable::new(book.augmented_schema().clone());
    for (title, author, extra) in seeds {
        let mut values = vec![("title", json!(title)), ("author", json!(author))];
        if let Some((column, value)) = extra {
            if book.augmented_schema().column(column).is_some() {
                values.push((column, json!(value)));
            }
        }
        table.insert(resolver.construct(values))?;
    }
    info!("Seeded {} books", table.len());

    // Step 3: Read every title in every language
    for language in translator.languages() {
        translator.set_active_language(language.clone());
        for row in table.rows() {
            info!(
                "[{}] {} by {}",
                language,
                resolver.get(row, "title"),
                resolver.get(row, "author")
            );
        }
    }

    let report = translator.metrics().report();
    info!("Resolution metrics: {}", serde_json::to_string(&report)?);

    Ok(())
}
