mod ai;
mod auth;
mod config;
mod document;
mod errors;
mod generation;
mod json_resume;
mod models;
mod routes;
mod settings;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{PasswordGate, SessionStore};
use crate::config::Config;
use crate::document::DocumentStore;
use crate::routes::build_router;
use crate::settings::SettingsStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Load the portfolio document (seeded from a JSON Resume file on first run)
    let documents =
        DocumentStore::open(config.document_path(), config.document_seed_path.clone()).await?;

    // Restore AI settings saved by a previous session
    let settings = SettingsStore::open(config.credentials_path()).await;

    let gate = PasswordGate::new(config.edit_password_hash.clone());
    let sessions = SessionStore::new(chrono::Duration::seconds(config.session_ttl_secs));
    info!(
        "Editor protection: {} (session ttl {}s)",
        if gate.is_enabled() { "enabled" } else { "disabled" },
        config.session_ttl_secs
    );

    let state = AppState {
        documents,
        settings,
        gate,
        sessions,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the editor UI has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
