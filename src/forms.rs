//! Contact form payloads, validation and the submission state machine.
//!
//! Validation runs twice on purpose: once in the client layer before a
//! request is attempted, and again in the relay handler before forwarding
//! to the automation service.

use crate::i18n::Locale;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Minimum length for the free-text message field.
const MIN_MESSAGE_LEN: usize = 10;

/// The four project types a lead can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Web,
    Ecommerce,
    Consulting,
    Other,
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Web => "web",
            Self::Ecommerce => "ecommerce",
            Self::Consulting => "consulting",
            Self::Other => "other",
        };
        write!(f, "{}", label)
    }
}

/// One contact/lead submission. Lives for a single request-response cycle;
/// the automation service owns anything persisted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactFormData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub project_type: Option<ProjectType>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default)]
    pub locale: Locale,
}

/// Which form field a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Name,
    Email,
    ProjectType,
    Message,
}

/// A field plus its localized user-facing message.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: FormField,
    pub message: &'static str,
}

fn email_regex() -> &'static regex::Regex {
    static EMAIL: OnceLock<regex::Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        // RFC-shape check, not full RFC 5322
        regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
    })
}

impl ContactFormData {
    /// Validate every field, collecting all failures rather than stopping
    /// at the first. Messages come from the payload's own locale.
    pub fn validate(&self) -> Vec<FieldError> {
        let strings = self.locale.strings();
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError {
                field: FormField::Name,
                message: strings.form_name_required,
            });
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.push(FieldError {
                field: FormField::Email,
                message: strings.form_email_required,
            });
        } else if !email_regex().is_match(email) {
            errors.push(FieldError {
                field: FormField::Email,
                message: strings.form_email_invalid,
            });
        }

        if self.project_type.is_none() {
            errors.push(FieldError {
                field: FormField::ProjectType,
                message: strings.form_project_type_required,
            });
        }

        if self.message.trim().chars().count() < MIN_MESSAGE_LEN {
            errors.push(FieldError {
                field: FormField::Message,
                message: strings.form_message_too_short,
            });
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// Submission lifecycle. Both terminal states return to `Idle` only via
/// [`SubmissionState::reset`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Success,
    Error {
        message: String,
    },
}

impl SubmissionState {
    /// `Idle -> Submitting`. Returns false (state unchanged) from any
    /// other state; a submission already in flight cannot be restarted.
    pub fn begin(&mut self) -> bool {
        if *self == Self::Idle {
            *self = Self::Submitting;
            true
        } else {
            false
        }
    }

    /// `Submitting -> Success`.
    pub fn succeed(&mut self) {
        if *self == Self::Submitting {
            *self = Self::Success;
        }
    }

    /// `Submitting -> Error`.
    pub fn fail(&mut self, message: impl Into<String>) {
        if *self == Self::Submitting {
            *self = Self::Error {
                message: message.into(),
            };
        }
    }

    /// Explicit reset from either terminal state back to `Idle`.
    pub fn reset(&mut self) {
        if matches!(self, Self::Success | Self::Error { .. }) {
            *self = Self::Idle;
        }
    }

    pub fn is_submitting(&self) -> bool {
        *self == Self::Submitting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ContactFormData {
        ContactFormData {
            name: "María López".to_string(),
            email: "maria@example.co".to_string(),
            project_type: Some(ProjectType::Web),
            message: "Necesito una tienda online para mi negocio.".to_string(),
            company: None,
            budget: None,
            timeline: None,
            locale: Locale::SPANISH,
        }
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_valid_form_passes() {
        assert!(valid_form().is_valid());
    }

    #[test]
    fn test_empty_form_collects_all_errors() {
        let form = ContactFormData {
            name: String::new(),
            email: String::new(),
            project_type: None,
            message: String::new(),
            company: None,
            budget: None,
            timeline: None,
            locale: Locale::SPANISH,
        };
        let errors = form.validate();
        assert_eq!(errors.len(), 4);
        let fields: Vec<FormField> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&FormField::Name));
        assert!(fields.contains(&FormField::Email));
        assert!(fields.contains(&FormField::ProjectType));
        assert!(fields.contains(&FormField::Message));
    }

    #[test]
    fn test_message_length_boundary() {
        let mut form = valid_form();
        form.message = "123456789".to_string();
        assert!(!form.is_valid());

        form.message = "1234567890".to_string();
        assert!(form.is_valid());
    }

    #[test]
    fn test_message_length_counts_chars_not_bytes() {
        let mut form = valid_form();
        // 10 characters, more than 10 bytes
        form.message = "ñañañañañ!".to_string();
        assert!(form.is_valid());
    }

    #[test]
    fn test_email_shapes() {
        let mut form = valid_form();

        form.email = "name@example.co".to_string();
        assert!(form.is_valid());

        for bad in ["sin-arroba.com", "dos@@example.com", "name@", "@example.com", "a b@example.com"] {
            form.email = bad.to_string();
            assert!(!form.is_valid(), "accepted invalid email {:?}", bad);
        }
    }

    #[test]
    fn test_whitespace_only_name_rejected() {
        let mut form = valid_form();
        form.name = "   ".to_string();
        assert!(!form.is_valid());
    }

    #[test]
    fn test_messages_follow_payload_locale() {
        let mut form = valid_form();
        form.name = String::new();

        form.locale = Locale::SPANISH;
        let es = form.validate()[0].message;

        form.locale = Locale::ENGLISH;
        let en = form.validate()[0].message;

        assert_ne!(es, en);
    }

    // ==================== Serde Tests ====================

    #[test]
    fn test_deserialize_camel_case_payload() {
        let json = r#"{
            "name": "Ana",
            "email": "ana@example.com",
            "projectType": "ecommerce",
            "message": "Quiero vender online ya.",
            "locale": "en"
        }"#;
        let form: ContactFormData = serde_json::from_str(json).unwrap();
        assert_eq!(form.project_type, Some(ProjectType::Ecommerce));
        assert_eq!(form.locale, Locale::ENGLISH);
        assert!(form.company.is_none());
    }

    #[test]
    fn test_missing_fields_default_rather_than_fail() {
        let form: ContactFormData = serde_json::from_str("{}").unwrap();
        assert!(form.name.is_empty());
        assert!(form.project_type.is_none());
        assert_eq!(form.locale, Locale::default_locale());
        assert!(!form.is_valid());
    }

    // ==================== State Machine Tests ====================

    #[test]
    fn test_full_success_cycle() {
        let mut state = SubmissionState::default();
        assert!(state.begin());
        assert!(state.is_submitting());
        state.succeed();
        assert_eq!(state, SubmissionState::Success);
        state.reset();
        assert_eq!(state, SubmissionState::Idle);
    }

    #[test]
    fn test_error_requires_explicit_reset() {
        let mut state = SubmissionState::Idle;
        state.begin();
        state.fail("algo falló");
        assert!(matches!(state, SubmissionState::Error { .. }));
        assert!(!state.begin());
        state.reset();
        assert!(state.begin());
    }

    #[test]
    fn test_no_double_submit() {
        let mut state = SubmissionState::Idle;
        assert!(state.begin());
        assert!(!state.begin());
    }

    #[test]
    fn test_terminal_transitions_only_from_submitting() {
        let mut state = SubmissionState::Idle;
        state.succeed();
        assert_eq!(state, SubmissionState::Idle);
        state.fail("ignored");
        assert_eq!(state, SubmissionState::Idle);
    }
}
