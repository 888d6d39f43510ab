//! Backend for a bilingual (es/en) marketing site: blog content served from
//! flat markdown files, SEO metadata and JSON-LD generation, a contact-form
//! relay to the BuildShip automation service, a keyword chatbot with a
//! remote override, and fire-and-forget telemetry fan-out.

pub mod analytics;
pub mod buildship;
pub mod chatbot;
pub mod config;
pub mod content;
pub mod errors;
pub mod forms;
pub mod i18n;
pub mod markdown;
pub mod rate_limit;
pub mod retry;
pub mod security;
pub mod seo;
pub mod server;
