use crate::analytics::Sink;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, loaded once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Public origin used for canonical URLs and alternate links
    pub site_base_url: String,
    /// Root of the markdown content tree (locale subdirectories below it)
    pub content_dir: PathBuf,
    pub port: u16,
    pub buildship_base_url: String,
    pub buildship_api_key: Option<String>,
    /// Shared secret for inbound webhook signatures
    pub webhook_secret: String,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window: Duration,
    /// External telemetry sinks; all optional, order is not significant
    pub analytics_sinks: Vec<Sink>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let site_base_url =
            env::var("SITE_BASE_URL").context("SITE_BASE_URL must be set")?;

        let content_dir = env::var("CONTENT_DIR")
            .unwrap_or_else(|_| "content".to_string())
            .into();

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid port number")?;

        let buildship_base_url =
            env::var("BUILDSHIP_BASE_URL").context("BUILDSHIP_BASE_URL must be set")?;

        let buildship_api_key = env::var("BUILDSHIP_API_KEY").ok();

        let webhook_secret =
            env::var("WEBHOOK_SECRET").context("WEBHOOK_SECRET must be set")?;
        anyhow::ensure!(
            webhook_secret.len() >= 16,
            "WEBHOOK_SECRET must be at least 16 characters"
        );

        let rate_limit_max_requests = env::var("RATE_LIMIT_MAX_REQUESTS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .context("RATE_LIMIT_MAX_REQUESTS must be a number")?;

        let rate_limit_window_secs: u64 = env::var("RATE_LIMIT_WINDOW_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .context("RATE_LIMIT_WINDOW_SECS must be a number")?;

        let analytics_sinks = [
            ("analytics", "ANALYTICS_PLATFORM_URL"),
            ("ad_pixel", "AD_PIXEL_URL"),
            ("marketing", "MARKETING_WEBHOOK_URL"),
            ("chat_ops", "CHAT_OPS_WEBHOOK_URL"),
        ]
        .into_iter()
        .filter_map(|(name, var)| {
            env::var(var).ok().map(|url| Sink {
                name: name.to_string(),
                url,
            })
        })
        .collect();

        Ok(Self {
            site_base_url,
            content_dir,
            port,
            buildship_base_url,
            buildship_api_key,
            webhook_secret,
            rate_limit_max_requests,
            rate_limit_window: Duration::from_secs(rate_limit_window_secs),
            analytics_sinks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn set_required_vars() {
        env::set_var("SITE_BASE_URL", "https://estudiodigital.dev");
        env::set_var("BUILDSHIP_BASE_URL", "https://api.buildship.run/flows");
        env::set_var("WEBHOOK_SECRET", "0123456789abcdef0123456789abcdef");
    }

    fn clear_all_vars() {
        for var in [
            "SITE_BASE_URL",
            "CONTENT_DIR",
            "PORT",
            "BUILDSHIP_BASE_URL",
            "BUILDSHIP_API_KEY",
            "WEBHOOK_SECRET",
            "RATE_LIMIT_MAX_REQUESTS",
            "RATE_LIMIT_WINDOW_SECS",
            "ANALYTICS_PLATFORM_URL",
            "AD_PIXEL_URL",
            "MARKETING_WEBHOOK_URL",
            "CHAT_OPS_WEBHOOK_URL",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_applied() {
        clear_all_vars();
        set_required_vars();

        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.content_dir, PathBuf::from("content"));
        assert_eq!(config.rate_limit_max_requests, 60);
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
        assert!(config.analytics_sinks.is_empty());
        assert!(config.buildship_api_key.is_none());
    }

    #[test]
    #[serial]
    fn test_missing_required_var_fails() {
        clear_all_vars();
        env::set_var("SITE_BASE_URL", "https://estudiodigital.dev");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("BUILDSHIP_BASE_URL"));
    }

    #[test]
    #[serial]
    fn test_short_webhook_secret_rejected() {
        clear_all_vars();
        set_required_vars();
        env::set_var("WEBHOOK_SECRET", "short");

        assert!(Config::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_sinks_collected_from_present_vars() {
        clear_all_vars();
        set_required_vars();
        env::set_var("ANALYTICS_PLATFORM_URL", "https://plausible.io/api/event");
        env::set_var("CHAT_OPS_WEBHOOK_URL", "https://hooks.example.com/chat");

        let config = Config::from_env().unwrap();
        assert_eq!(config.analytics_sinks.len(), 2);
        let names: Vec<&str> = config
            .analytics_sinks
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert!(names.contains(&"analytics"));
        assert!(names.contains(&"chat_ops"));
    }

    #[test]
    #[serial]
    fn test_invalid_port_rejected() {
        clear_all_vars();
        set_required_vars();
        env::set_var("PORT", "not-a-port");

        assert!(Config::from_env().is_err());
    }
}
