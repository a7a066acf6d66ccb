use std::sync::Arc;

use crate::llm_client::ChatProvider;
use crate::models::chat::ProviderKind;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Gemini wrapper. Default provider for `/api/chat` and `/api/chatnormal`.
    pub gemini: Arc<dyn ChatProvider>,
    /// OpenRouter wrapper. Serves `/api/openrouter` and `provider: "openrouter"` chats.
    pub openrouter: Arc<dyn ChatProvider>,
}

impl AppState {
    pub fn provider(&self, kind: ProviderKind) -> &Arc<dyn ChatProvider> {
        match kind {
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::OpenRouter => &self.openrouter,
        }
    }
}
