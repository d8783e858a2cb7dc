//! Language type: validated language representation.

use crate::i18n::{LanguageConfig, LanguageRegistry, LanguageStrings};
use anyhow::{bail, Result};

/// A validated language.
///
/// Only codes present and enabled in the registry can be turned into a
/// `Language`, so every `Language` has a registry entry and a string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    code: &'static str,
}

impl Language {
    /// English, the canonical language every item must be translated into.
    pub const ENGLISH: Language = Language { code: "en" };

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

    /// Get the canonical (fallback) language.
    pub fn canonical() -> Language {
        let config = LanguageRegistry::get().canonical();
        Language { code: config.code }
    }

    /// Language code as used in translation records.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the language code is not found in the registry. This cannot
    /// happen for a Language built through `from_code` or the constants.
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

    /// Interface strings for this language.
    pub fn strings(&self) -> &'static LanguageStrings {
        LanguageStrings::for_code(self.code)
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::canonical()
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

    // ==================== Constant Tests ====================

    #[test]
    fn test_english_constant() {
        let english = Language::ENGLISH;
        assert_eq!(english.code(), "en");
        assert_eq!(english.name(), "English");
        assert!(english.is_canonical());
    }

    #[test]
    fn test_default_is_canonical() {
        assert_eq!(Language::default(), Language::ENGLISH);
    }

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_french() {
        let french = Language::from_code("fr").unwrap();
        assert_eq!(french.code(), "fr");
        assert_eq!(french.native_name(), "Français");
        assert!(!french.is_canonical());
    }

    #[test]
    fn test_from_code_unknown() {
        let err = Language::from_code("xx").unwrap_err();
        assert!(err.to_string().contains("Unknown language code"));
    }

    #[test]
    fn test_display_is_code() {
        assert_eq!(Language::from_code("jp").unwrap().to_string(), "jp");
    }

    #[test]
    fn test_strings_follow_language() {
        let italian = Language::from_code("it").unwrap();
        assert_eq!(italian.strings().all_label, "Tutti");
    }
}
