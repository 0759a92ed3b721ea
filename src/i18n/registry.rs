//! Language registry: Single source of truth for all supported languages.
//!
//! The registry is a lazily initialised `OnceLock` singleton; it never changes
//! after first access.

use std::sync::OnceLock;

/// Metadata for a supported target language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Code used by callers and persisted as the preference (e.g. "hindi")
    pub code: &'static str,

    /// English name, embedded in translation prompts (e.g. "Hindi")
    pub name: &'static str,

    /// Name in the language itself, shown in language pickers (e.g. "हिन्दी")
    pub native_name: &'static str,

    /// Whether this is the base language UI strings are written in
    pub is_canonical: bool,

    pub enabled: bool,
}

pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all enabled languages, in picker order.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Get the canonical language configuration.
    ///
    /// # Panics
    /// Panics if the built-in table does not define exactly one canonical
    /// language.
    pub fn canonical(&self) -> &LanguageConfig {
        let canonical_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();

        match canonical_langs.len() {
            0 => panic!("No canonical language found in registry"),
            1 => canonical_langs[0],
            _ => panic!("Multiple canonical languages found in registry"),
        }
    }

    /// Check if a language code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }

    /// Name to put in a prompt for `code`; unknown codes are passed through
    /// as-is so callers can still target languages outside the table.
    pub fn prompt_name<'a>(&self, code: &'a str) -> &'a str {
        match self.get_by_code(code) {
            Some(config) => config.name,
            None => code,
        }
    }
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "english",
            name: "English",
            native_name: "English",
            is_canonical: true,
            enabled: true,
        },
        LanguageConfig {
            code: "hindi",
            name: "Hindi",
            native_name: "हिन्दी",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            code: "tamil",
            name: "Tamil",
            native_name: "தமிழ்",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            code: "telugu",
            name: "Telugu",
            native_name: "తెలుగు",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            code: "kannada",
            name: "Kannada",
            native_name: "ಕನ್ನಡ",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            code: "malayalam",
            name: "Malayalam",
            native_name: "മലയാളം",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            code: "marathi",
            name: "Marathi",
            native_name: "मराठी",
            is_canonical: false,
            enabled: true,
        },
    ]
}
