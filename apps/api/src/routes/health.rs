use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version, and which provider keys are configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "chatfolio-api",
        "providers": {
            "gemini": state.gemini.is_configured(),
            "openrouter": state.openrouter.is_configured()
        }
    }))
}
