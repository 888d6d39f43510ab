//! Telemetry capture and fan-out.
//!
//! Events are sampled per category, stamped, and forwarded to zero or more
//! external sinks. Delivery is strictly best-effort: one sink failing never
//! blocks or fails the others, and the caller never sees a delivery error.

use chrono::Utc;
use futures::future::join_all;
use rand::Rng;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, trace};

const SINK_TIMEOUT: Duration = Duration::from_secs(5);

/// Web-vital quality bucket against the fixed per-metric thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rating {
    Good,
    NeedsImprovement,
    Poor,
}

/// Classify a web-vital value. Unknown metric names get no rating.
///
/// Thresholds follow the published Core Web Vitals boundaries; CLS is
/// unitless, everything else is milliseconds.
pub fn rate_web_vital(name: &str, value: f64) -> Option<Rating> {
    let (good, poor) = match name {
        "LCP" => (2500.0, 4000.0),
        "FID" => (100.0, 300.0),
        "CLS" => (0.1, 0.25),
        "INP" => (200.0, 500.0),
        "TTFB" => (800.0, 1800.0),
        "FCP" => (1800.0, 3000.0),
        _ => return None,
    };

    Some(if value <= good {
        Rating::Good
    } else if value <= poor {
        Rating::NeedsImprovement
    } else {
        Rating::Poor
    })
}

/// One telemetry event. The tag doubles as the sampling category.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalyticsEvent {
    PageView {
        path: String,
        locale: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        referrer: Option<String>,
    },
    WebVital {
        name: String,
        value: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        rating: Option<Rating>,
    },
    CustomMetric {
        name: String,
        value: f64,
    },
    Interaction {
        action: String,
        target: String,
    },
    FormFunnel {
        form: String,
        step: String,
    },
    ErrorReport {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        stack: Option<String>,
    },
}

impl AnalyticsEvent {
    /// Build a web-vital event with its rating precomputed.
    pub fn web_vital(name: impl Into<String>, value: f64) -> Self {
        let name = name.into();
        let rating = rate_web_vital(&name, value);
        Self::WebVital { name, value, rating }
    }

    /// Independent sampling probability per category. Vitals, page views,
    /// funnel steps and errors are always kept; the chattier categories
    /// are heavily downsampled.
    pub fn sample_rate(&self) -> f64 {
        match self {
            Self::PageView { .. } => 1.0,
            Self::WebVital { .. } => 1.0,
            Self::CustomMetric { .. } => 0.1,
            Self::Interaction { .. } => 0.05,
            Self::FormFunnel { .. } => 1.0,
            Self::ErrorReport { .. } => 1.0,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::PageView { .. } => "page_view",
            Self::WebVital { .. } => "web_vital",
            Self::CustomMetric { .. } => "custom_metric",
            Self::Interaction { .. } => "interaction",
            Self::FormFunnel { .. } => "form_funnel",
            Self::ErrorReport { .. } => "error_report",
        }
    }
}

/// Keep-or-drop decision for a given draw in `[0, 1)`.
pub fn should_sample(draw: f64, rate: f64) -> bool {
    draw < rate
}

#[derive(Debug, Clone, Serialize)]
struct SinkPayload<'a> {
    #[serde(flatten)]
    event: &'a AnalyticsEvent,
    timestamp: String,
}

/// A named downstream destination.
#[derive(Debug, Clone)]
pub struct Sink {
    pub name: String,
    pub url: String,
}

/// Fan-out pipeline over the configured sinks (0 to 4 in practice).
#[derive(Debug, Clone)]
pub struct AnalyticsPipeline {
    client: reqwest::Client,
    sinks: Vec<Sink>,
}

impl AnalyticsPipeline {
    pub fn new(sinks: Vec<Sink>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(SINK_TIMEOUT)
                .build()
                .unwrap_or_default(),
            sinks,
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Sample and deliver an event. Returns true when the event was kept
    /// by sampling, regardless of delivery outcome; delivery failures are
    /// logged at debug and dropped.
    pub async fn record(&self, event: AnalyticsEvent) -> bool {
        let draw = rand::thread_rng().gen::<f64>();
        if !should_sample(draw, event.sample_rate()) {
            trace!("Dropped {} event by sampling", event.kind());
            return false;
        }
        self.deliver(&event).await;
        true
    }

    /// Push one event to every sink, all settled: each send is awaited to
    /// completion and failures never propagate across sinks.
    pub async fn deliver(&self, event: &AnalyticsEvent) {
        if self.sinks.is_empty() {
            return;
        }

        let payload = SinkPayload {
            event,
            timestamp: Utc::now().to_rfc3339(),
        };

        let sends = self.sinks.iter().map(|sink| {
            let client = self.client.clone();
            let payload = &payload;
            async move {
                let result = client.post(&sink.url).json(payload).send().await;
                match result {
                    Ok(response) if response.status().is_success() => {}
                    Ok(response) => {
                        debug!(
                            "Analytics sink {} returned {}",
                            sink.name,
                            response.status()
                        );
                    }
                    Err(e) => {
                        debug!("Analytics sink {} unreachable: {}", sink.name, e);
                    }
                }
            }
        });

        join_all(sends).await;
    }
}
