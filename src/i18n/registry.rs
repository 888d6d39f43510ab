//! Locale registry: single source of truth for the locales the site serves.
//!
//! The registry is a singleton behind `OnceLock` so that every component
//! (routing, SEO alternates, string tables) agrees on the same locale set.

use std::sync::OnceLock;

/// Configuration for a supported locale.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// ISO 639-1 language code used as the URL path segment (e.g., "es", "en")
    pub code: &'static str,

    /// English name of the language (e.g., "Spanish", "English")
    pub name: &'static str,

    /// Native name of the language (e.g., "Español", "English")
    pub native_name: &'static str,

    /// Value emitted in `hreflang` attributes and alternate links
    pub hreflang: &'static str,

    /// Whether this locale is the fallback when resolution fails (only one should be true)
    pub is_default: bool,

    /// Whether this locale is enabled for serving
    pub enabled: bool,
}

/// Global locale registry singleton.
pub struct LocaleRegistry {
    locales: Vec<LocaleConfig>,
}

static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    /// Get the global locale registry instance.
    pub fn get() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(|| LocaleRegistry {
            locales: default_locales(),
        })
    }

    /// Get a locale configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.iter().find(|locale| locale.code == code)
    }

    /// Get all enabled locales, in declaration order (default first).
    pub fn list_enabled(&self) -> Vec<&LocaleConfig> {
        self.locales
            .iter()
            .filter(|locale| locale.enabled)
            .collect()
    }

    /// Get the default locale configuration.
    ///
    /// # Panics
    /// Panics if no default locale is found or if multiple defaults are
    /// defined; either indicates a configuration error.
    pub fn default_locale(&self) -> &LocaleConfig {
        let defaults: Vec<_> = self
            .locales
            .iter()
            .filter(|locale| locale.is_default)
            .collect();

        match defaults.len() {
            0 => panic!("No default locale found in registry"),
            1 => defaults[0],
            _ => panic!("Multiple default locales found in registry"),
        }
    }

    /// Check if a locale code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|locale| locale.enabled)
            .unwrap_or(false)
    }
}

/// The site serves Spanish (default) and English.
fn default_locales() -> Vec<LocaleConfig> {
    vec![
        LocaleConfig {
            code: "es",
            name: "Spanish",
            native_name: "Español",
            hreflang: "es",
            is_default: true,
            enabled: true,
        },
        LocaleConfig {
            code: "en",
            name: "English",
            native_name: "English",
            hreflang: "en",
            is_default: false,
            enabled: true,
        },
    ]
}
