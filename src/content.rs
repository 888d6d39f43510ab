//! Blog content store: flat markdown files under a locale-specific directory.
//!
//! Every read is best-effort. A missing directory, unreadable file or broken
//! front-matter degrades to an empty list or `None` with a log line; the
//! page renderer cannot meaningfully recover from a content crash.

use crate::i18n::Locale;
use crate::markdown::{render_markdown, word_count};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reading speed used when front-matter omits an explicit reading time.
const WORDS_PER_MINUTE: usize = 200;

/// Byline used when front-matter omits an author.
const DEFAULT_AUTHOR: &str = "Equipo Estudio Digital";

/// One published blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    /// Derived from the filename; unique within a locale directory
    pub slug: String,
    pub title: String,
    pub description: String,
    /// Free-form category string, not a closed enum
    pub category: String,
    pub tags: Vec<String>,
    /// ISO-8601 date string
    pub published_at: String,
    pub featured: bool,
    /// Minutes, always >= 1
    pub reading_time: u32,
    pub author: String,
    /// Raw markdown in listings, rendered HTML from `post_by_slug`
    pub content: String,
}

/// YAML front-matter as written in the content files.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrontMatter {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    tags: Vec<String>,
    published_at: Option<String>,
    #[serde(default)]
    featured: bool,
    reading_time: Option<u32>,
    author: Option<String>,
}

/// Filesystem-backed post store rooted at the content directory.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn locale_dir(&self, locale: Locale) -> PathBuf {
        self.root.join(locale.code())
    }

    /// All posts for a locale, newest first.
    ///
    /// Returns an empty list (never an error) when the directory is missing
    /// or unreadable; individual broken files are skipped with a warning.
    pub fn all_posts(&self, locale: Locale) -> Vec<BlogPost> {
        let dir = self.locale_dir(locale);

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read content directory {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        let mut posts: Vec<BlogPost> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("md"))
            .filter_map(|path| match load_post(&path) {
                Ok(post) => Some(post),
                Err(e) => {
                    warn!("Skipping unreadable post {}: {:#}", path.display(), e);
                    None
                }
            })
            .collect();

        // Newest first; unparseable dates sort last
        posts.sort_by(|a, b| {
            let date_a = parse_published_at(&a.published_at);
            let date_b = parse_published_at(&b.published_at);
            date_b.cmp(&date_a)
        });

        debug!("Loaded {} posts for locale {}", posts.len(), locale);
        posts
    }

    /// A single post by slug, with the markdown body rendered to HTML.
    ///
    /// Returns `None` for a missing file, a traversal-shaped slug, or any
    /// parse failure.
    pub fn post_by_slug(&self, slug: &str, locale: Locale) -> Option<BlogPost> {
        if slug.is_empty() || slug.contains('/') || slug.contains("..") {
            return None;
        }

        let path = self.locale_dir(locale).join(format!("{}.md", slug));
        match load_post(&path) {
            Ok(mut post) => {
                post.content = render_markdown(&post.content);
                Some(post)
            }
            Err(e) => {
                debug!("Post {} ({}) not available: {:#}", slug, locale, e);
                None
            }
        }
    }

    /// Posts in a category (exact match, case-insensitive), newest first.
    pub fn posts_by_category(&self, category: &str, locale: Locale) -> Vec<BlogPost> {
        self.all_posts(locale)
            .into_iter()
            .filter(|post| post.category.eq_ignore_ascii_case(category))
            .collect()
    }

    /// Posts flagged `featured: true`, newest first.
    pub fn featured_posts(&self, locale: Locale) -> Vec<BlogPost> {
        self.all_posts(locale)
            .into_iter()
            .filter(|post| post.featured)
            .collect()
    }

    /// Up to `limit` posts sharing a category, excluding the current slug.
    pub fn related_posts(
        &self,
        exclude_slug: &str,
        category: &str,
        locale: Locale,
        limit: usize,
    ) -> Vec<BlogPost> {
        self.all_posts(locale)
            .into_iter()
            .filter(|post| post.slug != exclude_slug)
            .filter(|post| post.category.eq_ignore_ascii_case(category))
            .take(limit)
            .collect()
    }

    /// Case-insensitive substring search across title, description, tags
    /// and category.
    pub fn search_posts(&self, query: &str, locale: Locale) -> Vec<BlogPost> {
        let needle = query.to_lowercase();
        if needle.trim().is_empty() {
            return Vec::new();
        }

        self.all_posts(locale)
            .into_iter()
            .filter(|post| {
                post.title.to_lowercase().contains(&needle)
                    || post.description.to_lowercase().contains(&needle)
                    || post.category.to_lowercase().contains(&needle)
                    || post
                        .tags
                        .iter()
                        .any(|tag| tag.to_lowercase().contains(&needle))
            })
            .collect()
    }
}

/// Parse a front-matter date: RFC 3339 first, then bare `YYYY-MM-DD`.
fn parse_published_at(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `ceil(words / 200)`, clamped to at least one minute.
fn reading_time_minutes(words: usize) -> u32 {
    (words.div_ceil(WORDS_PER_MINUTE)).max(1) as u32
}

/// Missing `publishedAt` falls back to the file's modification time so that
/// repeated reads stay deterministic; exotic filesystems without mtime fall
/// back to the Unix epoch.
fn published_at_fallback(path: &Path) -> String {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map(|mtime| DateTime::<Utc>::from(mtime).to_rfc3339())
        .unwrap_or_else(|_| DateTime::<Utc>::UNIX_EPOCH.to_rfc3339())
}

fn load_post(path: &Path) -> Result<BlogPost> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;

    let (front, body) = split_front_matter(&raw)
        .with_context(|| format!("parsing front-matter of {}", path.display()))?;

    let slug = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .context("filename is not valid UTF-8")?
        .to_string();

    let reading_time = match front.reading_time {
        Some(minutes) if minutes >= 1 => minutes,
        _ => reading_time_minutes(word_count(body)),
    };

    let published_at = front
        .published_at
        .unwrap_or_else(|| published_at_fallback(path));

    Ok(BlogPost {
        slug,
        title: front.title,
        description: front.description,
        category: front.category,
        tags: front.tags,
        published_at,
        featured: front.featured,
        reading_time,
        author: front.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        content: body.to_string(),
    })
}

/// Split a `---` delimited YAML front-matter block from the markdown body.
fn split_front_matter(raw: &str) -> Result<(FrontMatter, &str)> {
    let rest = raw
        .strip_prefix("---")
        .context("missing front-matter opening delimiter")?;

    let end = rest
        .find("\n---")
        .context("missing front-matter closing delimiter")?;

    let yaml = &rest[..end];
    let body = rest[end + 4..].trim_start_matches(['\r', '\n']);

    let front: FrontMatter =
        serde_yaml::from_str(yaml).context("invalid YAML front-matter")?;

    Ok((front, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn write_post(dir: &TempDir, locale: &str, slug: &str, contents: &str) {
        let locale_dir = dir.path().join(locale);
        std::fs::create_dir_all(&locale_dir).expect("create locale dir");
        std::fs::write(locale_dir.join(format!("{}.md", slug)), contents).expect("write post");
    }

    fn sample_post(title: &str, published_at: &str) -> String {
        format!(
            "---\ntitle: {}\ndescription: Una descripción\ncategory: desarrollo\ntags:\n  - rust\n  - web\npublishedAt: \"{}\"\nfeatured: true\n---\n\n# Hola\n\nContenido del artículo.\n",
            title, published_at
        )
    }

    // ==================== all_posts Tests ====================

    #[test]
    fn test_all_posts_sorted_newest_first() {
        let dir = TempDir::new().unwrap();
        write_post(&dir, "es", "viejo", &sample_post("Viejo", "2023-01-10"));
        write_post(&dir, "es", "nuevo", &sample_post("Nuevo", "2024-06-01"));
        write_post(&dir, "es", "medio", &sample_post("Medio", "2023-09-15"));

        let store = ContentStore::new(dir.path());
        let posts = store.all_posts(Locale::SPANISH);

        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].slug, "nuevo");
        assert_eq!(posts[1].slug, "medio");
        assert_eq!(posts[2].slug, "viejo");
    }

    #[test]
    fn test_all_posts_missing_directory_returns_empty() {
        let store = ContentStore::new("/nonexistent/content/root");
        assert!(store.all_posts(Locale::SPANISH).is_empty());
    }

    #[test]
    fn test_all_posts_skips_broken_file() {
        let dir = TempDir::new().unwrap();
        write_post(&dir, "es", "bueno", &sample_post("Bueno", "2024-01-01"));
        write_post(&dir, "es", "roto", "no front matter at all");

        let store = ContentStore::new(dir.path());
        let posts = store.all_posts(Locale::SPANISH);

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "bueno");
    }

    #[test]
    fn test_all_posts_ignores_non_markdown_files() {
        let dir = TempDir::new().unwrap();
        write_post(&dir, "es", "post", &sample_post("Post", "2024-01-01"));
        std::fs::write(dir.path().join("es/notes.txt"), "not a post").unwrap();

        let store = ContentStore::new(dir.path());
        assert_eq!(store.all_posts(Locale::SPANISH).len(), 1);
    }

    #[test]
    fn test_locales_are_isolated() {
        let dir = TempDir::new().unwrap();
        write_post(&dir, "es", "hola", &sample_post("Hola", "2024-01-01"));
        write_post(&dir, "en", "hello", &sample_post("Hello", "2024-01-01"));

        let store = ContentStore::new(dir.path());
        let es = store.all_posts(Locale::SPANISH);
        let en = store.all_posts(Locale::ENGLISH);

        assert_eq!(es.len(), 1);
        assert_eq!(es[0].slug, "hola");
        assert_eq!(en.len(), 1);
        assert_eq!(en[0].slug, "hello");
    }

    // ==================== post_by_slug Tests ====================

    #[test]
    fn test_post_by_slug_renders_html() {
        let dir = TempDir::new().unwrap();
        write_post(&dir, "es", "hola", &sample_post("Hola", "2024-01-01"));

        let store = ContentStore::new(dir.path());
        let post = store.post_by_slug("hola", Locale::SPANISH).unwrap();

        assert!(post.content.contains("<h1"));
        assert!(post.content.contains("<p>Contenido del artículo.</p>"));
    }

    #[test]
    fn test_post_by_slug_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = ContentStore::new(dir.path());
        assert!(store.post_by_slug("nada", Locale::SPANISH).is_none());
    }

    #[test]
    fn test_post_by_slug_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        write_post(&dir, "es", "hola", &sample_post("Hola", "2024-01-01"));

        let store = ContentStore::new(dir.path());
        assert!(store.post_by_slug("../es/hola", Locale::SPANISH).is_none());
        assert!(store.post_by_slug("", Locale::SPANISH).is_none());
    }

    // ==================== Derived Field Tests ====================

    #[test]
    fn test_defaults_applied() {
        let dir = TempDir::new().unwrap();
        write_post(
            &dir,
            "es",
            "minimo",
            "---\ntitle: Mínimo\n---\n\nSolo un párrafo corto.\n",
        );

        let store = ContentStore::new(dir.path());
        let posts = store.all_posts(Locale::SPANISH);

        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.author, DEFAULT_AUTHOR);
        assert!(!post.featured);
        assert!(post.tags.is_empty());
        assert_eq!(post.reading_time, 1);
        // Fallback date comes from the file's mtime, which parses as RFC 3339
        assert!(parse_published_at(&post.published_at).is_some());
    }

    #[test]
    fn test_explicit_reading_time_wins() {
        let dir = TempDir::new().unwrap();
        write_post(
            &dir,
            "es",
            "largo",
            "---\ntitle: Largo\nreadingTime: 12\n---\n\ncorto\n",
        );

        let store = ContentStore::new(dir.path());
        let post = &store.all_posts(Locale::SPANISH)[0];
        assert_eq!(post.reading_time, 12);
    }

    #[test]
    fn test_reading_time_computed_from_word_count() {
        let dir = TempDir::new().unwrap();
        let body: String = std::iter::repeat("palabra").take(450).collect::<Vec<_>>().join(" ");
        write_post(
            &dir,
            "es",
            "computado",
            &format!("---\ntitle: Computado\n---\n\n{}\n", body),
        );

        let store = ContentStore::new(dir.path());
        let post = &store.all_posts(Locale::SPANISH)[0];
        // ceil(450 / 200) = 3
        assert_eq!(post.reading_time, 3);
    }

    #[test]
    fn test_reading_time_minutes_floor_cases() {
        assert_eq!(reading_time_minutes(0), 1);
        assert_eq!(reading_time_minutes(1), 1);
        assert_eq!(reading_time_minutes(200), 1);
        assert_eq!(reading_time_minutes(201), 2);
        assert_eq!(reading_time_minutes(400), 2);
    }

    proptest! {
        #[test]
        fn prop_reading_time_positive_and_monotonic(words in 0usize..100_000) {
            let minutes = reading_time_minutes(words);
            prop_assert!(minutes >= 1);
            prop_assert!(reading_time_minutes(words * 2) >= minutes);
        }
    }

    // ==================== Filter Tests ====================

    #[test]
    fn test_featured_and_category_filters() {
        let dir = TempDir::new().unwrap();
        write_post(&dir, "es", "destacado", &sample_post("Destacado", "2024-02-01"));
        write_post(
            &dir,
            "es",
            "normal",
            "---\ntitle: Normal\ncategory: negocio\n---\n\ntexto\n",
        );

        let store = ContentStore::new(dir.path());

        let featured = store.featured_posts(Locale::SPANISH);
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].slug, "destacado");

        let dev = store.posts_by_category("Desarrollo", Locale::SPANISH);
        assert_eq!(dev.len(), 1);
        assert_eq!(dev[0].slug, "destacado");
    }

    #[test]
    fn test_related_posts_excludes_self_and_limits() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            write_post(
                &dir,
                "es",
                &format!("post-{}", i),
                &sample_post(&format!("Post {}", i), &format!("2024-01-0{}", i + 1)),
            );
        }

        let store = ContentStore::new(dir.path());
        let related = store.related_posts("post-4", "desarrollo", Locale::SPANISH, 3);

        assert_eq!(related.len(), 3);
        assert!(related.iter().all(|p| p.slug != "post-4"));
    }

    #[test]
    fn test_search_matches_tags_case_insensitive() {
        let dir = TempDir::new().unwrap();
        write_post(&dir, "es", "rustico", &sample_post("Rústico", "2024-01-01"));

        let store = ContentStore::new(dir.path());

        assert_eq!(store.search_posts("RUST", Locale::SPANISH).len(), 1);
        assert_eq!(store.search_posts("descripción", Locale::SPANISH).len(), 1);
        assert!(store.search_posts("kubernetes", Locale::SPANISH).is_empty());
        assert!(store.search_posts("   ", Locale::SPANISH).is_empty());
    }

    // ==================== Date Parsing Tests ====================

    #[test]
    fn test_parse_published_at_formats() {
        assert!(parse_published_at("2024-01-15").is_some());
        assert!(parse_published_at("2024-01-15T10:30:00+00:00").is_some());
        assert!(parse_published_at("not a date").is_none());
    }
}
