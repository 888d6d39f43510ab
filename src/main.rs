use anyhow::Result;
use std::sync::Arc;
use studio_site::analytics::AnalyticsPipeline;
use studio_site::buildship::BuildshipClient;
use studio_site::config::Config;
use studio_site::content::ContentStore;
use studio_site::rate_limit::MemoryRateLimitStore;
use studio_site::server::{self, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("studio_site=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        "Starting site backend for {} (content at {})",
        config.site_base_url,
        config.content_dir.display()
    );

    let state = AppState {
        content: Arc::new(ContentStore::new(config.content_dir.clone())),
        buildship: Arc::new(BuildshipClient::new(
            config.buildship_base_url.clone(),
            config.buildship_api_key.clone(),
        )),
        analytics: Arc::new(AnalyticsPipeline::new(config.analytics_sinks.clone())),
        rate_limiter: Arc::new(MemoryRateLimitStore::new()),
        config: Arc::new(config),
    };

    server::serve(state).await
}
