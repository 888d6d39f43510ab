//! Chatbot responder: static keyword table with a remote override.
//!
//! The remote BuildShip workflow gets first shot at every message under a
//! bounded timeout; any failure falls back to the local knowledge base, so
//! the widget keeps answering while the workflow is down.
//!
//! Match precedence is longest-keyword-wins. The original substring scan
//! was first-declared-wins, which made answers depend on table order; the
//! longest matching keyword is the most specific one, and declaration
//! order only breaks exact-length ties.

use crate::buildship::BuildshipClient;
use crate::i18n::Locale;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Budget for the remote override call.
const REMOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause before suggestions appear, so they read as a follow-up.
const SUGGESTION_DELAY: Duration = Duration::from_millis(600);

/// Chance of appending follow-up suggestions after a reply.
const SUGGESTION_PROBABILITY: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

/// Where a bot reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Buildship,
    KnowledgeBase,
    Suggestions,
    Error,
    Welcome,
}

/// One conversation turn. Held in memory only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ResponseSource>,
}

impl ChatMessage {
    fn user(content: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            content: content.into(),
            timestamp: Utc::now(),
            source: None,
        }
    }

    fn bot(content: impl Into<String>, source: ResponseSource) -> Self {
        Self {
            sender: Sender::Bot,
            content: content.into(),
            timestamp: Utc::now(),
            source: Some(source),
        }
    }
}

/// A canned answer: keywords in both languages share one entry so the
/// matched category never depends on the active locale.
#[derive(Debug)]
pub struct KnowledgeItem {
    pub category: &'static str,
    pub keywords: &'static [&'static str],
    pub response_es: &'static str,
    pub response_en: &'static str,
}

impl KnowledgeItem {
    pub fn response(&self, locale: Locale) -> &'static str {
        match locale.code() {
            "en" => self.response_en,
            _ => self.response_es,
        }
    }
}

/// The fixed in-memory knowledge base. The last entry is the default
/// answer and is excluded from keyword matching.
pub const KNOWLEDGE_BASE: &[KnowledgeItem] = &[
    KnowledgeItem {
        category: "greeting",
        keywords: &["hola", "buenos días", "buenas tardes", "hello", "hi there"],
        response_es: "¡Hola! Soy el asistente de Estudio Digital. ¿En qué puedo ayudarte hoy?",
        response_en: "Hi! I'm the Estudio Digital assistant. How can I help you today?",
    },
    KnowledgeItem {
        category: "services",
        keywords: &["servicios", "qué hacen", "services", "what do you do", "ofrecen"],
        response_es: "Diseñamos y desarrollamos sitios web, tiendas online y aplicaciones a medida. También ofrecemos consultoría técnica y SEO.",
        response_en: "We design and build websites, online stores and custom applications. We also offer technical consulting and SEO.",
    },
    KnowledgeItem {
        category: "pricing",
        keywords: &["precio", "cuesta", "cuánto", "presupuesto", "price", "cost", "how much", "budget"],
        response_es: "Cada proyecto es distinto, así que preparamos presupuestos a medida. Un sitio corporativo parte de los 2.500 €; cuéntanos tu idea y te enviamos una propuesta en 48 horas.",
        response_en: "Every project is different, so we quote each one individually. A corporate site starts at €2,500; tell us about your idea and we'll send a proposal within 48 hours.",
    },
    KnowledgeItem {
        category: "timeline",
        keywords: &["tiempo", "tarda", "plazo", "cuándo", "timeline", "how long", "deadline"],
        response_es: "Un proyecto típico tarda entre cuatro y ocho semanas, según el alcance. Te damos un calendario detallado con la propuesta.",
        response_en: "A typical project takes four to eight weeks depending on scope. You'll get a detailed schedule with the proposal.",
    },
    KnowledgeItem {
        category: "portfolio",
        keywords: &["portafolio", "trabajos anteriores", "ejemplos", "portfolio", "previous work", "examples"],
        response_es: "Puedes ver una selección de nuestros trabajos en la sección de proyectos del sitio. Si buscas algo de tu sector, dínoslo y te enseñamos casos parecidos.",
        response_en: "You can see a selection of our work in the projects section of the site. If you're after something in your industry, let us know and we'll share similar cases.",
    },
    KnowledgeItem {
        category: "contact",
        keywords: &["contacto", "teléfono", "correo", "contact", "phone", "email"],
        response_es: "Puedes escribirnos a hola@estudiodigital.dev o usar el formulario de contacto. Respondemos en menos de un día laborable.",
        response_en: "You can write to hola@estudiodigital.dev or use the contact form. We reply within one business day.",
    },
    KnowledgeItem {
        category: "default",
        keywords: &[],
        response_es: "No estoy seguro de haber entendido. ¿Puedes reformular la pregunta? También puedes escribirnos a hola@estudiodigital.dev.",
        response_en: "I'm not sure I understood. Could you rephrase the question? You can also write to hola@estudiodigital.dev.",
    },
];

fn default_item() -> &'static KnowledgeItem {
    // The table always ends with the default entry
    &KNOWLEDGE_BASE[KNOWLEDGE_BASE.len() - 1]
}

/// Match free text against the knowledge base.
///
/// Case-insensitive substring match; the entry owning the longest matching
/// keyword wins, with declaration order breaking ties. No match returns
/// the default entry.
pub fn find_best_response(text: &str, _locale: Locale) -> &'static KnowledgeItem {
    let haystack = text.to_lowercase();

    let mut best: Option<(&'static KnowledgeItem, usize)> = None;
    for item in KNOWLEDGE_BASE {
        for keyword in item.keywords {
            if haystack.contains(&keyword.to_lowercase())
                && best.map_or(true, |(_, len)| keyword.len() > len)
            {
                best = Some((item, keyword.len()));
            }
        }
    }

    best.map_or_else(default_item, |(item, _)| item)
}

/// Server-side conversation state plus the reply pipeline.
pub struct Responder {
    remote: Option<Arc<BuildshipClient>>,
    locale: Locale,
    suggestion_probability: f64,
    messages: Mutex<Vec<ChatMessage>>,
}

impl Responder {
    /// Start a conversation with the localized welcome message.
    pub fn new(locale: Locale, remote: Option<Arc<BuildshipClient>>) -> Self {
        let welcome = ChatMessage::bot(locale.strings().chat_welcome, ResponseSource::Welcome);
        Self {
            remote,
            locale,
            suggestion_probability: SUGGESTION_PROBABILITY,
            messages: Mutex::new(vec![welcome]),
        }
    }

    /// Override the suggestion draw, for deterministic tests.
    pub fn with_suggestion_probability(mut self, probability: f64) -> Self {
        self.suggestion_probability = probability;
        self
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn push(&self, message: ChatMessage) -> ChatMessage {
        if let Ok(mut guard) = self.messages.lock() {
            guard.push(message.clone());
        }
        message
    }

    /// One conversation turn. Appends the user message, produces a reply
    /// (remote first, knowledge base as fallback), and sometimes follows
    /// up with suggestions. Never fails; a blank input gets the apology.
    pub async fn send_message(&self, text: &str) -> ChatMessage {
        if text.trim().is_empty() {
            return self.push(ChatMessage::bot(
                self.locale.strings().chat_apology,
                ResponseSource::Error,
            ));
        }

        self.push(ChatMessage::user(text));

        let reply = match self.remote_response(text).await {
            Some(content) => ChatMessage::bot(content, ResponseSource::Buildship),
            None => {
                let item = find_best_response(text, self.locale);
                debug!("Knowledge-base reply, category {}", item.category);
                ChatMessage::bot(item.response(self.locale), ResponseSource::KnowledgeBase)
            }
        };
        let reply = self.push(reply);

        if rand::thread_rng().gen::<f64>() < self.suggestion_probability {
            tokio::time::sleep(SUGGESTION_DELAY).await;
            self.push(ChatMessage::bot(
                self.format_suggestions(),
                ResponseSource::Suggestions,
            ));
        }

        reply
    }

    async fn remote_response(&self, text: &str) -> Option<String> {
        let client = self.remote.as_ref()?;
        match timeout(REMOTE_TIMEOUT, client.forward_chatbot(text, self.locale)).await {
            Ok(Ok(response)) => Some(response),
            Ok(Err(e)) => {
                warn!("Remote chatbot call failed, using knowledge base: {}", e);
                None
            }
            Err(_) => {
                warn!(
                    "Remote chatbot call timed out after {:?}, using knowledge base",
                    REMOTE_TIMEOUT
                );
                None
            }
        }
    }

    fn format_suggestions(&self) -> String {
        let strings = self.locale.strings();
        let mut text = strings.chat_suggestions_intro.to_string();
        for suggestion in strings.chat_suggestions {
            text.push_str("\n• ");
            text.push_str(suggestion);
        }
        text
    }
}
