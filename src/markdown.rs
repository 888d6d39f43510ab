//! Markdown → HTML pipeline for blog content.
//!
//! Fixed plugin chain: GitHub-flavored extensions (tables, strikethrough,
//! footnotes, task lists), slug ids injected into headings, fenced code
//! blocks serialized with `language-*` classes for client-side highlighting.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;

/// Render a markdown body to HTML.
pub fn render_markdown(input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);

    let events = inject_heading_ids(Parser::new_ext(input, options));

    let mut out = String::with_capacity(input.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Whitespace-separated word count of a markdown body.
pub fn word_count(input: &str) -> usize {
    input.split_whitespace().count()
}

/// Turn heading text into a URL-safe anchor slug.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_was_dash = true; // Suppress leading dashes

    for c in text.chars() {
        if c.is_alphanumeric() {
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }

    slug.trim_end_matches('-').to_string()
}

/// Give every heading without an explicit id a slug derived from its text.
/// Repeated headings get `-1`, `-2`, ... suffixes so anchors stay unique.
fn inject_heading_ids(parser: Parser<'_>) -> Vec<Event<'_>> {
    let mut events = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut iter = parser.into_iter();

    while let Some(event) = iter.next() {
        match event {
            Event::Start(Tag::Heading {
                level,
                id: None,
                classes,
                attrs,
            }) => {
                // Buffer the heading's inline events to derive the slug
                let mut buffered = Vec::new();
                let mut text = String::new();

                for inner in iter.by_ref() {
                    let done = matches!(inner, Event::End(TagEnd::Heading(_)));
                    if let Event::Text(t) | Event::Code(t) = &inner {
                        text.push_str(t);
                    }
                    buffered.push(inner);
                    if done {
                        break;
                    }
                }

                let base = slugify(&text);
                let slug = match seen.get_mut(&base) {
                    Some(count) => {
                        *count += 1;
                        format!("{}-{}", base, count)
                    }
                    None => {
                        seen.insert(base.clone(), 0);
                        base
                    }
                };

                events.push(Event::Start(Tag::Heading {
                    level,
                    id: Some(CowStr::from(slug)),
                    classes,
                    attrs,
                }));
                events.extend(buffered);
            }
            other => events.push(other),
        }
    }

    events
}
