mod config;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod routes;
mod screening;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{GeminiClient, GenerationClient};
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

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

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize generative client
    let gemini = GeminiClient::new(
        config.google_api_key.clone(),
        config.llm_timeout,
        config.llm_max_attempts,
    )?;
    let llm = GenerationClient::new(Arc::new(gemini));
    info!(
        "LLM client initialized (model: {}, timeout: {:?}, attempts: {})",
        llm_client::MODEL,
        config.llm_timeout,
        config.llm_max_attempts
    );

    let sessions = Arc::new(SessionStore::new());
    spawn_session_sweeper(sessions.clone(), config.session_ttl);

    let state = AppState {
        llm,
        sessions,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict allowed origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically drops sessions that have been idle longer than `ttl`.
fn spawn_session_sweeper(sessions: Arc<SessionStore>, ttl: chrono::Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = sessions.purge_expired(ttl).await;
            if removed > 0 {
                info!(
                    "Purged {removed} expired sessions ({} active)",
                    sessions.len().await
                );
            }
        }
    });
}
