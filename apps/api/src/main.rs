mod config;
mod errors;
mod graph;
mod input;
mod models;
mod orchestrator;
mod presenter;
mod routes;
mod scoring_client;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::orchestrator::ScoreOrchestrator;
use crate::routes::build_router;
use crate::scoring_client::{HttpScoringClient, ScoringClient};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting FraudSense API v{}", env!("CARGO_PKG_VERSION"));

    let scoring: Arc<dyn ScoringClient> = Arc::new(HttpScoringClient::new(
        &config.scoring_api_url,
        config.scoring_timeout,
    )?);
    info!(
        "Scoring client initialized ({}, timeout {}s)",
        config.scoring_api_url,
        config.scoring_timeout.as_secs()
    );

    let orchestrator = ScoreOrchestrator::new(scoring.clone(), config.abort_superseded);

    let state = AppState {
        scoring,
        orchestrator,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the front-end origin once it has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
