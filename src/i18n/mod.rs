//! Language plumbing shared by every translatable record type.
//!
//! # Architecture
//!
//! - `language`: opaque `Language` identifier
//! - `context`: per-flow active language (`LocaleContext`)
//! - `fallback`: fallback chains and their validation
//! - `metrics`: resolution counters
//!
//! # Example
//!
//! ```rust
//! use model_translation::i18n::{FallbackLanguages, Language, LocaleContext};
//!
//! let context = LocaleContext::new(Language::new("en"));
//! context.set_active("pl");
//! assert_eq!(context.get_active().code(), "pl");
//!
//! let fallbacks = FallbackLanguages::new().with("pl", ["en"]).with_default(["en"]);
//! let pl = Language::new("pl");
//! let chain: Vec<&str> = fallbacks.candidates(&pl).map(Language::code).collect();
//! assert_eq!(chain, vec!["en"]);
//! ```

mod context;
mod fallback;
mod language;
mod metrics;

pub use context::LocaleContext;
pub use fallback::FallbackLanguages;
pub use language::{Language, DEFAULT_KEY};
pub use metrics::{MetricsReport, ResolutionMetrics};
