mod ai;
mod analysis;
mod config;
mod db;
mod errors;
mod interview;
mod keywords;
mod models;
mod ratings;
mod routes;
mod scoring;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dashmap::DashMap;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ai::gateway::ChatGateway;
use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PrepPilot API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize the AI gateway
    let ai = Arc::new(ChatGateway::new(
        config.ai_base_url.clone(),
        config.ai_api_key.clone(),
        config.ai_model.clone(),
        config.ai_fallback_model.clone(),
        Duration::from_secs(config.ai_timeout_secs),
    ));
    info!(
        "AI gateway initialized (model: {}, fallback: {})",
        config.ai_model, config.ai_fallback_model
    );

    // Build app state
    let state = AppState {
        db,
        ai,
        config: config.clone(),
        session_locks: Arc::new(DashMap::new()),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
