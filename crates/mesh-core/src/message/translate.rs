//! Template translation
//!
//! Translation runs on the resolved template before placeholder
//! substitution, so translated templates keep their `:field`/`:paramN` keys.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Host-provided translation hook
pub trait Translator: Send + Sync {
    /// Translation of `message` into `locale`, or `None` to keep the original
    fn translate(&self, message: &str, locale: &str) -> Option<String>;
}

/// Translations keyed by locale, then by source template.
///
/// A regional locale such as `fr-CA` falls back to its language (`fr`) when
/// it has no entry of its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationTable {
    locales: IndexMap<String, IndexMap<String, String>>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one translation
    pub fn insert(
        &mut self,
        locale: impl Into<String>,
        message: impl Into<String>,
        translation: impl Into<String>,
    ) -> &mut Self {
        self.locales
            .entry(normalize(&locale.into()))
            .or_default()
            .insert(message.into(), translation.into());
        self
    }

    /// Merge another table; entries in `other` win
    pub fn merge(&mut self, other: TranslationTable) -> &mut Self {
        for (locale, messages) in other.locales {
            for (message, translation) in messages {
                self.insert(locale.as_str(), message, translation);
            }
        }
        self
    }

    /// Locales with at least one translation
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }
}

impl Translator for TranslationTable {
    fn translate(&self, message: &str, locale: &str) -> Option<String> {
        let locale = normalize(locale);
        let language = locale.split('-').next().unwrap_or_default();
        let found = [locale.as_str(), language]
            .into_iter()
            .filter_map(|candidate| self.locales.get(candidate))
            .find_map(|table| table.get(message).cloned());
        found
    }
}

fn normalize(locale: &str) -> String {
    locale.trim().to_ascii_lowercase().replace('_', "-")
}
