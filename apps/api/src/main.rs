mod chat;
mod config;
mod errors;
mod facts;
mod llm_client;
mod models;
mod reply;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::{ChatProvider, GeminiClient, OpenRouterClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a malformed PORT)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Chatfolio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize provider clients
    let gemini: Arc<dyn ChatProvider> = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_base_url.clone(),
    )?);
    let openrouter: Arc<dyn ChatProvider> = Arc::new(OpenRouterClient::new(
        config.openrouter_api_key.clone(),
        config.openrouter_base_url.clone(),
    )?);

    for provider in [&gemini, &openrouter] {
        if provider.is_configured() {
            info!("{} client initialized", provider.name());
        } else {
            warn!("{} API key not set; requests to it will fail", provider.name());
        }
    }
    info!("Gemini model: {}", llm_client::gemini::MODEL);

    // Build app state
    let state = AppState { gemini, openrouter };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
