mod config;
mod errors;
mod extraction;
mod interpret;
mod llm_client;
mod questions;
mod routes;
mod schema;
mod session;
mod state;
mod template;
#[cfg(test)]
mod testing;
mod ui;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::document::PdfTextExtractor;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::store::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Extractor v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(
        config.llm_endpoint.clone(),
        config.llm_api_key.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!(
        "LLM client initialized (endpoint: {}, timeout: {}s)",
        llm.endpoint(),
        config.llm_timeout_secs
    );

    // The schema is re-read on every extraction; this only reports problems early.
    match schema::load_schema(&config.schema_path).await {
        Ok(_) => info!("Schema found at {}", config.schema_path.display()),
        Err(e) => warn!("{e}; extraction requests will fail until it is fixed"),
    }

    let sessions = SessionStore::default();
    let session_ttl = Duration::from_secs(config.session_ttl_secs);
    let sweep_every = (session_ttl / 4).min(Duration::from_secs(60));
    let _eviction = sessions.spawn_eviction(session_ttl, sweep_every);
    info!("Idle sessions expire after {}s", config.session_ttl_secs);

    let state = AppState {
        sessions,
        llm: Arc::new(llm),
        extractor: Arc::new(PdfTextExtractor),
        config: config.clone(),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
