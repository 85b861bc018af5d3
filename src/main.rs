use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use waveform_api::api::{create_router, AppState};
use waveform_api::config::Config;
use waveform_api::services::pipeline::PipelineSettings;
use waveform_api::services::providers::catalog::SpotifyCatalog;
use waveform_api::services::providers::model::ModelServiceClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("waveform_api=info,tower_http=info")
        }))
        .init();

    let timeout = Duration::from_secs(config.external_timeout_secs);
    let catalog = Arc::new(SpotifyCatalog::new(
        config.catalog_api_url.clone(),
        config.catalog_api_token.clone(),
        timeout,
    )?);
    let model = Arc::new(ModelServiceClient::new(
        config.model_service_url.clone(),
        timeout,
    )?);

    let state = AppState::new(
        catalog,
        model,
        PipelineSettings {
            candidate_limit: config.candidate_limit,
            scoring_concurrency: config.scoring_concurrency,
        },
    );
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
