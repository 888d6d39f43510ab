//! Locale-aware URL routing: every public page lives under a leading locale
//! segment (`/es/...`, `/en/...`).
//!
//! Resolution order for a request is path segment first, then the
//! `Accept-Language` header, then the default locale. All functions here are
//! pure; nothing is persisted per request.

use crate::i18n::Locale;
use serde::Serialize;

/// One `hreflang` alternate for a logical page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlternateLink {
    pub hreflang: &'static str,
    pub href: String,
}

/// Extract the locale from the first non-empty path segment.
///
/// Returns `None` when the segment is missing or not a supported locale;
/// callers then fall through to header or default resolution.
pub fn locale_from_path(path: &str) -> Option<Locale> {
    let first = path.split('/').find(|segment| !segment.is_empty())?;
    Locale::from_code(first).ok()
}

/// Strip a leading locale segment from a path, if present.
///
/// `/en/services` becomes `/services`; `/about` is returned unchanged.
/// A path that is only a locale segment (`/en`) collapses to `/`.
pub fn strip_locale(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    let mut parts = trimmed.splitn(2, '/');

    match parts.next() {
        Some(first) if Locale::is_valid(first) => {
            let rest = parts.next().unwrap_or("");
            if rest.is_empty() {
                "/".to_string()
            } else {
                format!("/{}", rest)
            }
        }
        _ => path.to_string(),
    }
}

/// Prefix a path with a locale segment, stripping any existing one first.
///
/// An empty (or root) path yields just `/{locale}`.
pub fn localized_path(path: &str, locale: Locale) -> String {
    let stripped = strip_locale(path);
    let rest = stripped.trim_start_matches('/');

    if rest.is_empty() {
        format!("/{}", locale.code())
    } else {
        format!("/{}/{}", locale.code(), rest)
    }
}

/// Resolve a locale from an `Accept-Language` header value.
///
/// Entries are `lang[-region];q=weight`, comma separated; a missing or
/// malformed `q=` defaults to weight 1.0. Entries are considered in
/// descending weight order and the first whose exact tag or primary subtag
/// is a supported locale wins. Anything else resolves to the default.
pub fn locale_from_accept_language(header: Option<&str>) -> Locale {
    let header = match header {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Locale::default_locale(),
    };

    let mut entries: Vec<(String, f64)> = header
        .split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }

            let mut parts = entry.split(';');
            let tag = parts.next()?.trim().to_ascii_lowercase();
            if tag.is_empty() {
                return None;
            }

            // Malformed quality values must not break negotiation
            let weight = parts
                .find_map(|param| {
                    let param = param.trim();
                    param.strip_prefix("q=").and_then(|q| q.parse::<f64>().ok())
                })
                .unwrap_or(1.0);

            Some((tag, weight))
        })
        .collect();

    // Stable sort keeps declaration order for equal weights
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    for (tag, _) in entries {
        if let Ok(locale) = Locale::from_code(&tag) {
            return locale;
        }
        let primary = tag.split('-').next().unwrap_or(&tag);
        if let Ok(locale) = Locale::from_code(primary) {
            return locale;
        }
    }

    Locale::default_locale()
}

/// Build one alternate link per enabled locale for the given path.
pub fn alternate_links(path: &str) -> Vec<AlternateLink> {
    Locale::all()
        .into_iter()
        .map(|locale| AlternateLink {
            hreflang: locale.config().hreflang,
            href: localized_path(path, locale),
        })
        .collect()
}
