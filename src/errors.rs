//! Error taxonomy shared by the API surface and the outbound relay.
//!
//! Every variant maps to an HTTP status, a stable machine code, a retryability
//! classification and a localized user-facing message. Raw error details stay
//! in logs; clients only ever see the fixed bilingual messages.

use crate::i18n::Locale;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Client-side validation failure (400)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or bad credentials / signature (401)
    #[error("unauthorized")]
    Unauthorized,

    /// Authenticated but not allowed (403)
    #[error("forbidden")]
    Forbidden,

    /// Resource does not exist (404)
    #[error("not found")]
    NotFound,

    /// Request volume cap hit (429)
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Upstream or internal failure (5xx)
    #[error("server error: {0}")]
    ServerError(String),

    /// Client-side abort after the timeout budget
    #[error("request timed out")]
    Timeout,

    /// Transport-level failure before a response arrived
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ApiError {
    /// Stable machine-readable code, mirrored in JSON error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::NotFound => "NOT_FOUND",
            ApiError::RateLimited { .. } => "RATE_LIMITED",
            ApiError::ServerError(_) => "SERVER_ERROR",
            ApiError::Timeout => "TIMEOUT",
            ApiError::NetworkError(_) => "NETWORK_ERROR",
        }
    }

    /// HTTP status for the API surface.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::NetworkError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Whether the relay may retry the operation that produced this error.
    ///
    /// Only timeouts, transport failures, 5xx and 429 qualify; other 4xx
    /// errors fail immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Timeout
                | ApiError::NetworkError(_)
                | ApiError::ServerError(_)
                | ApiError::RateLimited { .. }
        )
    }

    /// Fixed localized user-facing message for this error.
    pub fn localized_message(&self, locale: Locale) -> &'static str {
        let strings = locale.strings();
        match self {
            ApiError::InvalidRequest(_) => strings.error_invalid_request,
            ApiError::Unauthorized => strings.error_unauthorized,
            ApiError::Forbidden => strings.error_forbidden,
            ApiError::NotFound => strings.error_not_found,
            ApiError::RateLimited { .. } => strings.error_rate_limited,
            ApiError::ServerError(_) => strings.error_server,
            ApiError::Timeout => strings.error_timeout,
            ApiError::NetworkError(_) => strings.error_network,
        }
    }

    /// Classify an upstream HTTP status into the taxonomy.
    pub fn from_status(status: reqwest::StatusCode, body: String) -> ApiError {
        match status.as_u16() {
            400 => ApiError::InvalidRequest(body),
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound,
            429 => ApiError::RateLimited {
                retry_after_secs: 0,
            },
            _ => ApiError::ServerError(format!("upstream returned {}: {}", status, body)),
        }
    }

    /// Build the JSON error envelope `{ success: false, error, message, timestamp }`
    /// with the message localized for the given locale.
    pub fn into_response_for(self, locale: Locale) -> Response {
        let body = Json(serde_json::json!({
            "success": false,
            "error": self.code(),
            "message": self.localized_message(locale),
            "timestamp": Utc::now().to_rfc3339(),
        }));

        let mut response = (self.status(), body).into_response();
        if let ApiError::RateLimited { retry_after_secs } = self {
            if let Ok(value) = retry_after_secs.to_string().parse() {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::NetworkError(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_response_for(Locale::default_locale())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Classification Tests ====================

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::InvalidRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::RateLimited {
                retry_after_secs: 30
            }
            .status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::ServerError("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(ApiError::Timeout.is_retryable());
        assert!(ApiError::NetworkError("reset".into()).is_retryable());
        assert!(ApiError::ServerError("503".into()).is_retryable());
        assert!(ApiError::RateLimited {
            retry_after_secs: 5
        }
        .is_retryable());
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!ApiError::InvalidRequest("bad".into()).is_retryable());
        assert!(!ApiError::Unauthorized.is_retryable());
        assert!(!ApiError::Forbidden.is_retryable());
        assert!(!ApiError::NotFound.is_retryable());
    }

    #[test]
    fn test_from_status() {
        let err = ApiError::from_status(reqwest::StatusCode::BAD_REQUEST, "nope".into());
        assert!(matches!(err, ApiError::InvalidRequest(_)));
        assert!(!err.is_retryable());

        let err = ApiError::from_status(reqwest::StatusCode::SERVICE_UNAVAILABLE, String::new());
        assert!(matches!(err, ApiError::ServerError(_)));
        assert!(err.is_retryable());

        let err = ApiError::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS, String::new());
        assert!(matches!(err, ApiError::RateLimited { .. }));
    }

    // ==================== Localization Tests ====================

    #[test]
    fn test_localized_messages_differ_by_locale() {
        let err = ApiError::Timeout;
        let es = err.localized_message(Locale::SPANISH);
        let en = err.localized_message(Locale::ENGLISH);

        assert_ne!(es, en);
        assert!(!es.is_empty());
        assert!(!en.is_empty());
    }

    #[test]
    fn test_every_variant_has_messages_in_both_locales() {
        let variants = [
            ApiError::InvalidRequest(String::new()),
            ApiError::Unauthorized,
            ApiError::Forbidden,
            ApiError::NotFound,
            ApiError::RateLimited {
                retry_after_secs: 1,
            },
            ApiError::ServerError(String::new()),
            ApiError::Timeout,
            ApiError::NetworkError(String::new()),
        ];

        for err in &variants {
            assert!(!err.localized_message(Locale::SPANISH).is_empty());
            assert!(!err.localized_message(Locale::ENGLISH).is_empty());
        }
    }

    #[test]
    fn test_code_stability() {
        assert_eq!(ApiError::Timeout.code(), "TIMEOUT");
        assert_eq!(ApiError::NotFound.code(), "NOT_FOUND");
        assert_eq!(
            ApiError::RateLimited {
                retry_after_secs: 0
            }
            .code(),
            "RATE_LIMITED"
        );
    }
}
