//! Supported target languages.
//!
//! - `registry`: Single source of truth for all supported languages and their metadata
//! - `language`: Validated `Language` type built from registry codes
//!
//! # Example
//!
//! ```rust,ignore
//! use ui_translate::i18n::{Language, LanguageRegistry};
//!
//! let hindi = Language::from_code("hindi")?;
//! let languages = LanguageRegistry::get().list_enabled();
//! ```

mod language;
mod registry;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
