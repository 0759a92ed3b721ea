//! Language type: a target language validated against the registry.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};

/// A validated, enabled language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "english" };
    pub const HINDI: Language = Language { code: "hindi" };
    pub const TAMIL: Language = Language { code: "tamil" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is valid and the language is enabled
    /// * `Err` if the code is not found or the language is disabled
    pub fn from_code(code: &str) -> Result<Language> {
        let registry = LanguageRegistry::get();

        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(Language { code: config.code }),
            Some(_) => bail!("Language '{}' is not enabled", code),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// The base language UI strings are authored in.
    pub fn canonical() -> Language {
        let config = LanguageRegistry::get().canonical();
        Language { code: config.code }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// # Panics
    /// Panics if the code is missing from the registry, which cannot happen
    /// for values built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_canonical(&self) -> bool {
        self.config().is_canonical
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_resolve() {
        assert_eq!(Language::ENGLISH.name(), "English");
        assert_eq!(Language::HINDI.name(), "Hindi");
        assert_eq!(Language::TAMIL.native_name(), "தமிழ்");
    }

    #[test]
    fn test_from_code_known() {
        let language = Language::from_code("kannada").expect("Should succeed");
        assert_eq!(language.code(), "kannada");
        assert_eq!(language.name(), "Kannada");
    }

    #[test]
    fn test_from_code_unknown() {
        let result = Language::from_code("fr");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    #[test]
    fn test_canonical_is_english() {
        let canonical = Language::canonical();
        assert_eq!(canonical, Language::ENGLISH);
        assert!(canonical.is_canonical());
        assert!(!Language::HINDI.is_canonical());
    }

    #[test]
    fn test_display_is_code() {
        assert_eq!(Language::TAMIL.to_string(), "tamil");
    }
}
