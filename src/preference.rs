//! Persisted language preference.
//!
//! Stores the user's selected target language as a small JSON file, read once
//! at startup and rewritten whenever the selection changes. Unknown or
//! unreadable values fall back to the canonical language.

use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::i18n::{Language, LanguageRegistry};

#[derive(Debug, Serialize, Deserialize)]
struct StoredPreference {
    preferred_language: String,
}

pub struct LanguagePreference {
    path: PathBuf,
    current: RwLock<Language>,
}

impl LanguagePreference {
    /// Load the saved preference from `path`, defaulting to the canonical
    /// language when the file is missing or holds an unsupported code.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match load(&path) {
            Ok(Some(language)) => language,
            Ok(None) => Language::canonical(),
            Err(e) => {
                warn!("Ignoring saved language preference: {:#}", e);
                Language::canonical()
            }
        };

        Self {
            path,
            current: RwLock::new(current),
        }
    }

    pub fn current(&self) -> Language {
        *self.current.read()
    }

    /// Switch to `code` and persist it.
    ///
    /// Unsupported codes leave the preference untouched and return
    /// `Ok(false)`; only a failed write is an error.
    pub fn change(&self, code: &str) -> Result<bool> {
        if !LanguageRegistry::get().is_enabled(code) {
            warn!("Ignoring unsupported language '{}'", code);
            return Ok(false);
        }
        let language = Language::from_code(code)?;

        save(&self.path, language)?;
        *self.current.write() = language;
        info!("Preferred language set to {}", language.name());
        Ok(true)
    }
}

fn load(path: &Path) -> Result<Option<Language>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let stored: StoredPreference = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(Language::from_code(&stored.preferred_language).ok())
}

fn save(path: &Path, language: Language) -> Result<()> {
    let stored = StoredPreference {
        preferred_language: language.code().to_string(),
    };
    let json = serde_json::to_string_pretty(&stored)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write {}", path.display()))
}
