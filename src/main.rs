//! Inbox Triage Service — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the triage engine, the mail source,
//! and the commit sink behind a thin JSON surface.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use inbox_triage::analyze::build_client_from_config;
use inbox_triage::api::{self, AppState};
use inbox_triage::commit::MemorySink;
use inbox_triage::config::ai::AiConfig;
use inbox_triage::engine::TriageEngine;
use inbox_triage::inbox::providers::mock::MockMailSource;
use inbox_triage::metrics::Metrics;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments. This enables
    // GEMINI_API_KEY / AI_TEST_MODE / PORT from .env.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = AiConfig::load_or_default();
    let client = build_client_from_config(&cfg);
    tracing::info!(provider = client.provider_name(), "analysis client ready");

    let archive = Arc::new(MemorySink::new());
    let engine = TriageEngine::new(client, archive.clone());
    let source = Arc::new(MockMailSource::new());

    let metrics = Metrics::init();
    let state = AppState::new(engine, archive, source);
    let app = api::create_router(state).merge(metrics.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
