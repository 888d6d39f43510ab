//! HTTP surface: the internal relay endpoints consumed by the site.
//!
//! Handlers resolve the request locale first so every error body comes back
//! in the caller's language, account the request against the rate limiter,
//! then do their work. Telemetry endpoints never fail the caller on
//! downstream trouble.

use crate::analytics::{AnalyticsEvent, AnalyticsPipeline};
use crate::buildship::BuildshipClient;
use crate::chatbot::{find_best_response, ResponseSource};
use crate::config::Config;
use crate::content::ContentStore;
use crate::errors::ApiError;
use crate::forms::ContactFormData;
use crate::i18n::Locale;
use crate::rate_limit::{Decision, RateLimitStore};
use crate::security::verify_webhook;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub content: Arc<ContentStore>,
    pub buildship: Arc<BuildshipClient>,
    pub analytics: Arc<AnalyticsPipeline>,
    pub rate_limiter: Arc<dyn RateLimitStore>,
}

/// Build the router with all relay routes and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/blog", post(blog_posts))
        .route("/api/buildship/contact", post(relay_contact))
        .route("/api/buildship/analytics", post(relay_analytics))
        .route("/api/buildship/chatbot", post(relay_chatbot))
        .route("/api/buildship/content", post(relay_content))
        .route("/api/buildship/health", get(buildship_health))
        .route("/api/buildship/webhook", post(buildship_webhook))
        .route("/api/analytics/conversions", post(record_conversion))
        .route("/api/analytics/errors", post(record_error))
        .route("/api/analytics/dashboard", get(analytics_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let port = state.config.port;
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on port {}", port);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Client identity for rate limiting: first `X-Forwarded-For` hop when
/// present (the service sits behind a proxy), else a shared bucket.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn check_rate_limit(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let key = client_key(headers);
    match state.rate_limiter.hit(
        &key,
        state.config.rate_limit_max_requests,
        state.config.rate_limit_window,
    ) {
        Decision::Allowed { .. } => Ok(()),
        Decision::Limited { retry_after_secs } => {
            debug!("Rate limited client {}", key);
            Err(ApiError::RateLimited { retry_after_secs })
        }
    }
}

/// Locale from an explicit query parameter; invalid values are a client
/// error, absence falls back to the default.
fn locale_from_query(params: &LocaleQuery) -> Result<Locale, ApiError> {
    match params.locale.as_deref() {
        Some(code) => Locale::from_code(code)
            .map_err(|_| ApiError::InvalidRequest(format!("unsupported locale '{}'", code))),
        None => Ok(Locale::default_locale()),
    }
}

fn success_envelope(data: Value) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": data,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Deserialize)]
struct LocaleQuery {
    locale: Option<String>,
}

// ==================== Blog ====================

#[derive(Debug, Serialize)]
struct BlogMeta {
    locale: Locale,
    count: usize,
    timestamp: String,
}

async fn blog_posts(
    State(state): State<AppState>,
    Query(params): Query<LocaleQuery>,
    headers: HeaderMap,
) -> Response {
    let locale = match locale_from_query(&params) {
        Ok(locale) => locale,
        Err(e) => return e.into_response_for(Locale::default_locale()),
    };

    if let Err(e) = check_rate_limit(&state, &headers) {
        return e.into_response_for(locale);
    }

    let posts = state.content.all_posts(locale);
    let meta = BlogMeta {
        locale,
        count: posts.len(),
        timestamp: Utc::now().to_rfc3339(),
    };

    Json(json!({ "posts": posts, "meta": meta })).into_response()
}

// ==================== BuildShip relays ====================

async fn relay_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<ContactFormData>,
) -> Response {
    let locale = form.locale;

    if let Err(e) = check_rate_limit(&state, &headers) {
        return e.into_response_for(locale);
    }

    // Server-side re-validation; the client already validated once
    let field_errors = form.validate();
    if !field_errors.is_empty() {
        return (
            axum::http::StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "INVALID_REQUEST",
                "fields": field_errors,
                "timestamp": Utc::now().to_rfc3339(),
            })),
        )
            .into_response();
    }

    match state.buildship.submit_contact(&form).await {
        Ok(receipt) => {
            info!("Contact submission {} relayed", receipt.id);
            success_envelope(json!(receipt)).into_response()
        }
        Err(e) => {
            warn!("Contact relay failed: {}", e);
            e.into_response_for(locale)
        }
    }
}

async fn relay_analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if let Err(e) = check_rate_limit(&state, &headers) {
        return e.into_response_for(Locale::default_locale());
    }

    match state.buildship.forward_analytics(&payload).await {
        Ok(data) => success_envelope(data).into_response(),
        Err(e) => e.into_response_for(Locale::default_locale()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatbotPayload {
    #[serde(default)]
    message: String,
    #[serde(default)]
    locale: Locale,
}

/// Relay a chatbot turn: remote workflow first, knowledge base when the
/// workflow is unreachable. The caller always gets an answer.
async fn relay_chatbot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ChatbotPayload>,
) -> Response {
    if let Err(e) = check_rate_limit(&state, &headers) {
        return e.into_response_for(payload.locale);
    }

    if payload.message.trim().is_empty() {
        return ApiError::InvalidRequest("message must not be empty".to_string())
            .into_response_for(payload.locale);
    }

    let (response, source) = match state
        .buildship
        .forward_chatbot(&payload.message, payload.locale)
        .await
    {
        Ok(remote) => (remote, ResponseSource::Buildship),
        Err(e) => {
            debug!("Remote chatbot failed, falling back: {}", e);
            let item = find_best_response(&payload.message, payload.locale);
            (
                item.response(payload.locale).to_string(),
                ResponseSource::KnowledgeBase,
            )
        }
    };

    success_envelope(json!({ "response": response, "source": source })).into_response()
}

async fn relay_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if let Err(e) = check_rate_limit(&state, &headers) {
        return e.into_response_for(Locale::default_locale());
    }

    match state.buildship.forward_content(&payload).await {
        Ok(data) => success_envelope(data).into_response(),
        Err(e) => e.into_response_for(Locale::default_locale()),
    }
}

async fn buildship_health(State(state): State<AppState>) -> Response {
    match state.buildship.health().await {
        Ok(health) => success_envelope(json!(health)).into_response(),
        Err(e) => {
            warn!("BuildShip health check failed: {}", e);
            e.into_response_for(Locale::default_locale())
        }
    }
}

// ==================== Webhook ====================

const TIMESTAMP_HEADER: &str = "x-webhook-timestamp";
const SIGNATURE_HEADER: &str = "x-webhook-signature";

async fn buildship_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let timestamp = headers
        .get(TIMESTAMP_HEADER)
        .and_then(|value| value.to_str().ok());
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let (Some(timestamp), Some(signature)) = (timestamp, signature) else {
        warn!("Webhook rejected: missing signature headers");
        return ApiError::Unauthorized.into_response_for(Locale::default_locale());
    };

    if let Err(e) = verify_webhook(
        &state.config.webhook_secret,
        timestamp,
        signature,
        &body,
        Utc::now(),
    ) {
        warn!("Webhook rejected: invalid signature or stale timestamp");
        return e.into_response_for(Locale::default_locale());
    }

    info!("Webhook accepted ({} bytes)", body.len());
    success_envelope(json!({ "received": true })).into_response()
}

// ==================== Telemetry sinks ====================

/// Record a conversion event. Always succeeds from the caller's point of
/// view; delivery happens in the background.
async fn record_conversion(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Response {
    let event = AnalyticsEvent::FormFunnel {
        form: string_field(&payload, "form").unwrap_or_else(|| "contact".to_string()),
        step: string_field(&payload, "step").unwrap_or_else(|| "conversion".to_string()),
    };

    let analytics = Arc::clone(&state.analytics);
    tokio::spawn(async move {
        analytics.record(event).await;
    });

    success_envelope(json!({ "recorded": true })).into_response()
}

async fn record_error(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Response {
    let event = AnalyticsEvent::ErrorReport {
        message: string_field(&payload, "message").unwrap_or_else(|| "unknown".to_string()),
        source: string_field(&payload, "source"),
        stack: string_field(&payload, "stack"),
    };

    let analytics = Arc::clone(&state.analytics);
    tokio::spawn(async move {
        analytics.record(event).await;
    });

    success_envelope(json!({ "recorded": true })).into_response()
}

async fn analytics_dashboard(State(state): State<AppState>) -> Response {
    success_envelope(json!({
        "sinks": state.analytics.sink_count(),
        "rateLimit": {
            "maxRequests": state.config.rate_limit_max_requests,
            "windowSecs": state.config.rate_limit_window.as_secs(),
        },
        "buildshipRateLimit": state.buildship.last_rate_limit(),
    }))
    .into_response()
}

fn string_field(payload: &Value, key: &str) -> Option<String> {
    payload.get(key).and_then(Value::as_str).map(str::to_string)
}
