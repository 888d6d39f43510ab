//! HTTP client for the BuildShip automation service.
//!
//! Every call carries a generated request id, honors the configured retry
//! policy for retryable failures only, and records any rate-limit headers
//! the service returns so callers can back off before the next attempt.

use crate::errors::ApiError;
use crate::forms::ContactFormData;
use crate::i18n::Locale;
use crate::retry::{with_retry_if, RetryConfig};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Rate-limit state reported by the service through response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatus {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    /// Unix seconds at which the window resets
    pub reset: Option<u64>,
    pub retry_after_secs: Option<u64>,
}

impl RateLimitStatus {
    /// True when the service reports the current window as exhausted.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0) || self.retry_after_secs.is_some()
    }
}

/// Receipt for an accepted contact submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactReceipt {
    pub id: String,
    pub status: String,
    pub submitted_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_response_time: Option<String>,
}

/// Health report for the automation service and its sub-services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub services: HealthServices,
    #[serde(default)]
    pub environment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthServices {
    pub contact: bool,
    pub analytics: bool,
    pub authentication: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatbotRequest<'a> {
    message: &'a str,
    locale: Locale,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatbotReply {
    response: String,
}

/// Client for the BuildShip workflow endpoints.
#[derive(Debug)]
pub struct BuildshipClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    retry: RetryConfig,
    rate_limit: Mutex<Option<RateLimitStatus>>,
}

impl BuildshipClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url,
            api_key,
            retry: RetryConfig::relay(),
            rate_limit: Mutex::new(None),
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// The most recently observed rate-limit headers, if any.
    pub fn last_rate_limit(&self) -> Option<RateLimitStatus> {
        self.rate_limit.lock().ok().and_then(|guard| *guard)
    }

    fn record_rate_limit(&self, headers: &HeaderMap) {
        if let Some(status) = parse_rate_limit_headers(headers) {
            if status.is_exhausted() {
                warn!("BuildShip rate limit exhausted: {:?}", status);
            }
            if let Ok(mut guard) = self.rate_limit.lock() {
                *guard = Some(status);
            }
        }
    }

    /// One POST attempt; retry classification happens in the caller.
    async fn post_once<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut request = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("x-request-id", &request_id)
            .json(body);

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        self.record_rate_limit(response.headers());

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_rate_limit_headers(response.headers())
                .and_then(|rl| rl.retry_after_secs);
            let body = response.text().await.unwrap_or_default();
            debug!(
                "BuildShip {} failed: {} (request {})",
                path, status, request_id
            );
            let error = ApiError::from_status(status, body);
            if let (ApiError::RateLimited { .. }, Some(secs)) = (&error, retry_after) {
                return Err(ApiError::RateLimited {
                    retry_after_secs: secs,
                });
            }
            return Err(error);
        }

        let parsed = response.json::<R>().await?;
        Ok(parsed)
    }

    async fn post_with_retry<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        name: &str,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        with_retry_if(
            &self.retry,
            name,
            || self.post_once(path, body),
            ApiError::is_retryable,
        )
        .await
    }

    /// Forward a validated contact submission.
    pub async fn submit_contact(
        &self,
        form: &ContactFormData,
    ) -> Result<ContactReceipt, ApiError> {
        self.post_with_retry("buildship_contact", "/contact", form)
            .await
    }

    /// Forward a telemetry batch. Callers treat failures as droppable.
    pub async fn forward_analytics(
        &self,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        self.post_with_retry("buildship_analytics", "/analytics", payload)
            .await
    }

    /// Ask the remote workflow for a generated chatbot response.
    ///
    /// Uses the tighter chatbot schedule instead of the client's relay
    /// policy: the widget is waiting on this call, so one quick retry is
    /// all the latency budget allows.
    pub async fn forward_chatbot(
        &self,
        message: &str,
        locale: Locale,
    ) -> Result<String, ApiError> {
        let config = RetryConfig::chatbot_remote();
        let body = ChatbotRequest { message, locale };
        let reply: ChatbotReply = with_retry_if(
            &config,
            "buildship_chatbot",
            || self.post_once("/chatbot", &body),
            ApiError::is_retryable,
        )
        .await?;
        Ok(reply.response)
    }

    /// Forward a content notification (new post published, etc).
    pub async fn forward_content(
        &self,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        self.post_with_retry("buildship_content", "/content", payload)
            .await
    }

    /// Service health, with its own more patient retry schedule.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let config = RetryConfig::health_check();
        with_retry_if(
            &config,
            "buildship_health",
            || async {
                let response = self
                    .client
                    .get(format!("{}/health", self.base_url))
                    .send()
                    .await?;
                self.record_rate_limit(response.headers());

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(ApiError::from_status(status, body));
                }
                Ok(response.json::<HealthStatus>().await?)
            },
            ApiError::is_retryable,
        )
        .await
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Extract rate-limit state from standard `x-ratelimit-*` / `retry-after`
/// headers. Returns `None` when no relevant header is present.
fn parse_rate_limit_headers(headers: &HeaderMap) -> Option<RateLimitStatus> {
    let status = RateLimitStatus {
        limit: header_u64(headers, "x-ratelimit-limit").map(|v| v as u32),
        remaining: header_u64(headers, "x-ratelimit-remaining").map(|v| v as u32),
        reset: header_u64(headers, "x-ratelimit-reset"),
        retry_after_secs: header_u64(headers, "retry-after"),
    };

    if status.limit.is_none()
        && status.remaining.is_none()
        && status.reset.is_none()
        && status.retry_after_secs.is_none()
    {
        None
    } else {
        Some(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                reqwest::header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    // ==================== Rate-Limit Header Tests ====================

    #[test]
    fn test_parse_full_rate_limit_headers() {
        let map = headers(&[
            ("x-ratelimit-limit", "100"),
            ("x-ratelimit-remaining", "42"),
            ("x-ratelimit-reset", "1717171717"),
        ]);
        let status = parse_rate_limit_headers(&map).unwrap();
        assert_eq!(status.limit, Some(100));
        assert_eq!(status.remaining, Some(42));
        assert_eq!(status.reset, Some(1_717_171_717));
        assert!(!status.is_exhausted());
    }

    #[test]
    fn test_parse_retry_after_alone() {
        let map = headers(&[("retry-after", "30")]);
        let status = parse_rate_limit_headers(&map).unwrap();
        assert_eq!(status.retry_after_secs, Some(30));
        assert!(status.is_exhausted());
    }

    #[test]
    fn test_zero_remaining_is_exhausted() {
        let map = headers(&[("x-ratelimit-remaining", "0")]);
        assert!(parse_rate_limit_headers(&map).unwrap().is_exhausted());
    }

    #[test]
    fn test_no_rate_limit_headers_gives_none() {
        let map = headers(&[("content-type", "application/json")]);
        assert!(parse_rate_limit_headers(&map).is_none());
    }

    #[test]
    fn test_garbage_header_values_ignored() {
        let map = headers(&[("retry-after", "soon"), ("x-ratelimit-limit", "100")]);
        let status = parse_rate_limit_headers(&map).unwrap();
        assert_eq!(status.retry_after_secs, None);
        assert_eq!(status.limit, Some(100));
    }

    // ==================== Payload Shape Tests ====================

    #[test]
    fn test_chatbot_request_serialization() {
        let request = ChatbotRequest {
            message: "hola",
            locale: Locale::SPANISH,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["message"], "hola");
        assert_eq!(json["locale"], "es");
    }

    #[test]
    fn test_health_status_deserialization() {
        let json = r#"{
            "status": "ok",
            "services": { "contact": true, "analytics": true, "authentication": false },
            "environment": "production"
        }"#;
        let health: HealthStatus = serde_json::from_str(json).unwrap();
        assert_eq!(health.status, "ok");
        assert!(!health.services.authentication);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = BuildshipClient::new("https://api.buildship.run/flows/", None);
        assert_eq!(client.base_url, "https://api.buildship.run/flows");
    }
}
