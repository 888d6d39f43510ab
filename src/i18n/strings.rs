//! All localized user-facing strings for a locale.
//!
//! Strings are plain text; HTML escaping is the renderer's concern.

/// Per-locale string table.
#[derive(Debug, Clone)]
pub struct LocaleStrings {
    // ==================== SEO Defaults ====================
    /// Site title used when a page supplies none
    pub default_title: &'static str,

    /// Suffix appended to page-supplied titles (" | Site Name")
    pub title_suffix: &'static str,

    /// Description used when a page supplies none
    pub default_description: &'static str,

    /// Base keyword set; page keywords are appended to these
    pub default_keywords: &'static [&'static str],

    // ==================== Contact Form Validation ====================
    /// Shown when the name field is empty
    pub form_name_required: &'static str,

    /// Shown when the email field is empty
    pub form_email_required: &'static str,

    /// Shown when the email does not look like an address
    pub form_email_invalid: &'static str,

    /// Shown when the message is empty or under the minimum length
    pub form_message_too_short: &'static str,

    /// Shown when no project type is selected
    pub form_project_type_required: &'static str,

    /// Inline panel after a successful submission
    pub form_success: &'static str,

    // ==================== Error Taxonomy ====================
    pub error_invalid_request: &'static str,
    pub error_unauthorized: &'static str,
    pub error_forbidden: &'static str,
    pub error_not_found: &'static str,
    pub error_rate_limited: &'static str,
    pub error_server: &'static str,
    pub error_timeout: &'static str,
    pub error_network: &'static str,

    // ==================== Chatbot ====================
    /// First bot message in a fresh conversation
    pub chat_welcome: &'static str,

    /// Apology with direct-contact fallback, shown on hard errors
    pub chat_apology: &'static str,

    /// Lead-in line for the suggestions message
    pub chat_suggestions_intro: &'static str,

    /// Suggested follow-up questions
    pub chat_suggestions: &'static [&'static str],

    // ==================== Blog States ====================
    /// Shown when the post listing failed to load
    pub blog_error_state: &'static str,

    /// Shown when a listing/search legitimately has no results
    pub blog_empty_state: &'static str,
}

// ==================== Spanish Strings (default) ====================

pub const SPANISH_STRINGS: LocaleStrings = LocaleStrings {
    default_title: "Estudio Digital — Desarrollo Web y Consultoría",
    title_suffix: " | Estudio Digital",
    default_description: "Desarrollo web a medida, e-commerce y consultoría tecnológica \
para empresas que quieren crecer en digital.",
    default_keywords: &[
        "desarrollo web",
        "e-commerce",
        "consultoría tecnológica",
        "diseño web",
    ],

    form_name_required: "Por favor, introduce tu nombre.",
    form_email_required: "Por favor, introduce tu correo electrónico.",
    form_email_invalid: "El correo electrónico no parece válido.",
    form_message_too_short: "Cuéntanos un poco más: el mensaje debe tener al menos 10 caracteres.",
    form_project_type_required: "Selecciona el tipo de proyecto.",
    form_success: "¡Gracias! Hemos recibido tu mensaje y te responderemos en 24-48 horas.",

    error_invalid_request: "Los datos enviados no son válidos. Revisa el formulario e inténtalo de nuevo.",
    error_unauthorized: "No tienes autorización para realizar esta acción.",
    error_forbidden: "Acceso denegado.",
    error_not_found: "No hemos encontrado lo que buscas.",
    error_rate_limited: "Demasiadas solicitudes. Espera un momento e inténtalo de nuevo.",
    error_server: "Algo ha fallado en nuestro lado. Inténtalo de nuevo en unos minutos.",
    error_timeout: "La solicitud ha tardado demasiado. Comprueba tu conexión e inténtalo de nuevo.",
    error_network: "No hemos podido conectar. Comprueba tu conexión e inténtalo de nuevo.",

    chat_welcome: "¡Hola! 👋 Soy el asistente del estudio. Pregúntame sobre servicios, \
precios o plazos.",
    chat_apology: "Lo siento, algo ha fallado por mi parte. Puedes escribirnos directamente \
a hola@estudiodigital.dev y te responderemos enseguida.",
    chat_suggestions_intro: "Quizá también te interese:",
    chat_suggestions: &[
        "¿Cuánto cuesta un proyecto?",
        "¿Qué servicios ofrecéis?",
        "¿Cuánto tarda un proyecto típico?",
    ],

    blog_error_state: "No hemos podido cargar los artículos. Inténtalo de nuevo más tarde.",
    blog_empty_state: "Todavía no hay artículos aquí.",
};

// ==================== English Strings ====================

pub const ENGLISH_STRINGS: LocaleStrings = LocaleStrings {
    default_title: "Estudio Digital — Web Development & Consulting",
    title_suffix: " | Estudio Digital",
    default_description: "Custom web development, e-commerce and technology consulting \
for companies that want to grow online.",
    default_keywords: &[
        "web development",
        "e-commerce",
        "technology consulting",
        "web design",
    ],

    form_name_required: "Please enter your name.",
    form_email_required: "Please enter your email address.",
    form_email_invalid: "That email address doesn't look right.",
    form_message_too_short: "Tell us a bit more: the message needs at least 10 characters.",
    form_project_type_required: "Please select a project type.",
    form_success: "Thanks! We got your message and will reply within 24-48 hours.",

    error_invalid_request: "The submitted data is invalid. Check the form and try again.",
    error_unauthorized: "You are not authorized to do that.",
    error_forbidden: "Access denied.",
    error_not_found: "We couldn't find what you're looking for.",
    error_rate_limited: "Too many requests. Give it a moment and try again.",
    error_server: "Something broke on our side. Please try again in a few minutes.",
    error_timeout: "The request took too long. Check your connection and try again.",
    error_network: "We couldn't connect. Check your connection and try again.",

    chat_welcome: "Hi! 👋 I'm the studio assistant. Ask me about services, pricing or timelines.",
    chat_apology: "Sorry, something went wrong on my end. You can reach us directly at \
hola@estudiodigital.dev and we'll get back to you right away.",
    chat_suggestions_intro: "You might also want to ask:",
    chat_suggestions: &[
        "How much does a project cost?",
        "What services do you offer?",
        "How long does a typical project take?",
    ],

    blog_error_state: "We couldn't load the articles. Please try again later.",
    blog_empty_state: "No articles here yet.",
};

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Spanish Strings Tests ====================

    #[test]
    fn test_spanish_seo_defaults_not_empty() {
        assert!(!SPANISH_STRINGS.default_title.is_empty());
        assert!(!SPANISH_STRINGS.default_description.is_empty());
        assert!(!SPANISH_STRINGS.default_keywords.is_empty());
    }

    #[test]
    fn test_spanish_apology_contains_contact() {
        assert!(SPANISH_STRINGS.chat_apology.contains("hola@estudiodigital.dev"));
    }

    // ==================== English Strings Tests ====================

    #[test]
    fn test_english_seo_defaults_not_empty() {
        assert!(!ENGLISH_STRINGS.default_title.is_empty());
        assert!(!ENGLISH_STRINGS.default_description.is_empty());
        assert!(!ENGLISH_STRINGS.default_keywords.is_empty());
    }

    #[test]
    fn test_english_apology_contains_contact() {
        assert!(ENGLISH_STRINGS.chat_apology.contains("hola@estudiodigital.dev"));
    }

    // ==================== Parity Tests ====================

    #[test]
    fn test_both_locales_share_title_suffix() {
        assert_eq!(SPANISH_STRINGS.title_suffix, ENGLISH_STRINGS.title_suffix);
    }

    #[test]
    fn test_suggestion_lists_have_same_length() {
        assert_eq!(
            SPANISH_STRINGS.chat_suggestions.len(),
            ENGLISH_STRINGS.chat_suggestions.len()
        );
    }

    #[test]
    fn test_no_placeholder_artifacts() {
        // No string table entry should leak template braces
        for s in [
            SPANISH_STRINGS.form_success,
            ENGLISH_STRINGS.form_success,
            SPANISH_STRINGS.chat_welcome,
            ENGLISH_STRINGS.chat_welcome,
        ] {
            assert!(!s.contains('{'));
        }
    }
}
