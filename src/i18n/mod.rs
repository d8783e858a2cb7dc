//! Internationalization (i18n) module for multi-language menus.
//!
//! Menu items carry their own per-language translations; this module owns the
//! set of languages the browser recognizes, the fallback rule, and the small
//! set of interface strings the render layer needs.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported languages and their metadata
//! - `language`: Type-safe Language type validated against the registry
//! - `strings`: Localized interface strings (category "All" label, empty state, actions)
//!
//! # Example
//!
//! ```rust,ignore
//! use menu_browser::i18n::{Language, LanguageRegistry};
//!
//! // Canonical language (English) is the fallback for every lookup
//! let canonical = Language::canonical();
//!
//! let french = Language::from_code("fr")?;
//! let languages = LanguageRegistry::get().list_enabled();
//! ```

mod language;
mod registry;
mod strings;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
pub use strings::LanguageStrings;
