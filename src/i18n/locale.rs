//! Locale type: flexible, validated locale representation.
//!
//! A `Locale` can only be constructed for codes that exist in the registry
//! and are enabled, so downstream code never has to re-validate.

use crate::i18n::strings::{ENGLISH_STRINGS, SPANISH_STRINGS};
use crate::i18n::{LocaleConfig, LocaleRegistry, LocaleStrings};
use anyhow::{bail, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locale {
    /// ISO 639-1 language code (e.g., "es", "en")
    code: &'static str,
}

impl Locale {
    /// Spanish, the site's default locale.
    pub const SPANISH: Locale = Locale { code: "es" };

    /// English.
    pub const ENGLISH: Locale = Locale { code: "en" };

    /// Create a Locale from a language code string.
    ///
    /// # Returns
    /// * `Ok(Locale)` if the code is supported and enabled
    /// * `Err` if the code is unknown or the locale is disabled
    pub fn from_code(code: &str) -> Result<Locale> {
        let registry = LocaleRegistry::get();

        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(Locale {
                code: config.code, // Use the static str from the registry
            }),
            Some(_) => bail!("Locale '{}' is not enabled", code),
            None => bail!("Unknown locale code: '{}'", code),
        }
    }

    /// Check whether a string is a supported, enabled locale code.
    pub fn is_valid(code: &str) -> bool {
        LocaleRegistry::get().is_enabled(code)
    }

    /// The fallback locale used whenever resolution fails.
    pub fn default_locale() -> Locale {
        let config = LocaleRegistry::get().default_locale();
        Locale { code: config.code }
    }

    /// All enabled locales, default first.
    pub fn all() -> Vec<Locale> {
        LocaleRegistry::get()
            .list_enabled()
            .into_iter()
            .map(|config| Locale { code: config.code })
            .collect()
    }

    /// Get the ISO 639-1 locale code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full locale configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is missing from the registry, which cannot happen
    /// for a properly constructed `Locale`.
    pub fn config(&self) -> &'static LocaleConfig {
        LocaleRegistry::get()
            .get_by_code(self.code)
            .expect("Locale code should always be valid")
    }

    /// Native name of the language (e.g., "Español").
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// The localized string table for this locale.
    pub fn strings(&self) -> &'static LocaleStrings {
        match self.code {
            "en" => &ENGLISH_STRINGS,
            _ => &SPANISH_STRINGS,
        }
    }

    /// Whether this is the default locale.
    pub fn is_default(&self) -> bool {
        self.config().is_default
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::default_locale()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Locale::from_code(&code).map_err(D::Error::custom)
    }
}
