//! Internationalization (i18n) module for the bilingual site.
//!
//! All locale-related logic lives here: the locale registry and validated
//! `Locale` type, locale-aware URL routing, and the localized string tables.
//!
//! # Architecture
//!
//! - `registry`: single source of truth for supported locales and their metadata
//! - `locale`: validated `Locale` type backed by the registry
//! - `routing`: path prefixing/stripping, `Accept-Language` negotiation, alternates
//! - `strings`: static per-locale string tables
//!
//! # Example
//!
//! ```rust,ignore
//! use studio_site::i18n::{self, Locale};
//!
//! let locale = i18n::locale_from_path("/en/services").unwrap_or_default();
//! let canonical = i18n::localized_path("/services", locale);
//! ```

mod locale;
mod registry;
mod routing;
pub mod strings;

pub use locale::Locale;
pub use registry::{LocaleConfig, LocaleRegistry};
pub use routing::{
    alternate_links, locale_from_accept_language, locale_from_path, localized_path, strip_locale,
    AlternateLink,
};
pub use strings::LocaleStrings;
