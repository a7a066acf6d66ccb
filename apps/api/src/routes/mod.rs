pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::chat::handlers;
use crate::errors::AppError;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Chat relay
        .route("/api/chat", post(handlers::handle_chat))
        .route("/api/chatnormal", post(handlers::handle_chat_normal))
        .route("/api/openrouter", post(handlers::handle_openrouter))
        // Form helpers
        .route("/api/facts", post(handlers::handle_facts))
        .route("/api/validate", post(handlers::handle_validate))
        .fallback(not_found)
        .with_state(state)
}
