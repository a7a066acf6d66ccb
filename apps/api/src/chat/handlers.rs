//! Axum route handlers for the chat relay.
//!
//! Flow per request: append the current user turn → extract facts →
//! compose role prompt + facts → provider call → parse structured reply.

use axum::{extract::State, Json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::prompts::{compose_system, ReplyFormat, PLAIN_CHAT_SYSTEM};
use crate::errors::AppError;
use crate::facts::{build_facts_context, extract_facts, validate_email, validate_phone};
use crate::llm_client::{Attribution, ChatProvider, LlmError, ProviderRequest};
use crate::models::chat::{
    ChatNormalRequest, ChatNormalResponse, ChatRequest, ChatResponse, ChatTurn, FactsRequest,
    FactsResponse, OpenRouterRequest, PromptRole, ProviderKind, ValidateRequest,
    ValidateResponse,
};
use crate::reply::parse_reply;
use crate::state::AppState;

fn reply_format(kind: ProviderKind) -> ReplyFormat {
    match kind {
        ProviderKind::Gemini => ReplyFormat::JsonOnly,
        ProviderKind::OpenRouter => ReplyFormat::ProseWithJsonBlock,
    }
}

/// Extracts facts from `turns`, builds the system text and relays the
/// conversation, returning the parsed reply.
async fn relay(
    provider: &dyn ChatProvider,
    role: PromptRole,
    format: ReplyFormat,
    turns: &[ChatTurn],
    model: Option<&str>,
    attribution: Option<&Attribution>,
) -> Result<ChatResponse, LlmError> {
    let request_id = Uuid::new_v4();
    let facts = extract_facts(turns);
    let facts_context = build_facts_context(&facts);
    let system = compose_system(role, format, &facts_context);

    info!(
        "[{}] Relaying {} turns to {} (role={:?}, known_facts={}, system_chars={})",
        request_id,
        turns.len(),
        provider.name(),
        role,
        facts.len(),
        system.len()
    );

    let raw = provider
        .complete(ProviderRequest {
            system: &system,
            turns,
            model,
            attribution,
            json_output: format == ReplyFormat::JsonOnly,
        })
        .await?;

    let reply = parse_reply(&raw);
    info!(
        "[{}] Received {} chars from {}, has_json={}",
        request_id,
        raw.len(),
        provider.name(),
        reply.structured.is_parsed()
    );

    Ok(ChatResponse {
        assistant_message: reply.assistant_text,
        resume_data: reply.structured.into_option(),
    })
}

fn with_current_turn(mut history: Vec<ChatTurn>, user_message: String) -> Vec<ChatTurn> {
    history.push(ChatTurn::user(user_message));
    history
}

/// POST /api/chat
///
/// Résumé-building chat. Provider failures are reported to the user as the
/// assistant message rather than as an HTTP error.
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.user_message.trim().is_empty() {
        return Err(AppError::Validation(
            "userMessage cannot be empty".to_string(),
        ));
    }

    let turns = with_current_turn(request.conversation_history, request.user_message);
    let provider = state.provider(request.provider);

    match relay(
        provider.as_ref(),
        request.role,
        reply_format(request.provider),
        &turns,
        None,
        None,
    )
    .await
    {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            warn!("{} chat failed: {}", provider.name(), e);
            Ok(Json(ChatResponse::error(e)))
        }
    }
}

/// POST /api/chatnormal
///
/// Plain-text chat through Gemini; no facts, no structured extraction.
pub async fn handle_chat_normal(
    State(state): State<AppState>,
    Json(request): Json<ChatNormalRequest>,
) -> Result<Json<ChatNormalResponse>, AppError> {
    if request.user_message.trim().is_empty() {
        return Err(AppError::Validation(
            "userMessage cannot be empty".to_string(),
        ));
    }

    let turns = with_current_turn(request.conversation_history, request.user_message);
    let result = state
        .gemini
        .complete(ProviderRequest {
            system: PLAIN_CHAT_SYSTEM,
            turns: &turns,
            model: None,
            attribution: None,
            json_output: false,
        })
        .await;

    let assistant_message = match result {
        Ok(text) => text,
        Err(e) => {
            warn!("plain chat failed: {}", e);
            format!("Error: {e}")
        }
    };
    Ok(Json(ChatNormalResponse { assistant_message }))
}

/// POST /api/openrouter
///
/// Caller-supplied message list relayed to OpenRouter with the résumé prompt.
/// Provider failures surface as HTTP 500.
pub async fn handle_openrouter(
    State(state): State<AppState>,
    Json(request): Json<OpenRouterRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.messages.is_empty() {
        return Err(AppError::Validation("messages cannot be empty".to_string()));
    }

    let attribution = Attribution {
        site_url: request.site_url,
        site_title: request.site_title,
    };
    let response = relay(
        state.openrouter.as_ref(),
        PromptRole::General,
        ReplyFormat::ProseWithJsonBlock,
        &request.messages,
        Some(&request.model),
        Some(&attribution),
    )
    .await?;

    Ok(Json(response))
}

/// POST /api/facts
///
/// Facts the extractor would inject for this conversation.
pub async fn handle_facts(Json(request): Json<FactsRequest>) -> Json<FactsResponse> {
    let facts = extract_facts(&request.conversation_history);
    let facts_context = build_facts_context(&facts);
    Json(FactsResponse {
        facts,
        facts_context,
    })
}

/// POST /api/validate
///
/// Validates user-edited form fields. Absent fields yield `null`.
pub async fn handle_validate(Json(request): Json<ValidateRequest>) -> Json<ValidateResponse> {
    Json(ValidateResponse {
        email: request.email.as_deref().map(validate_email),
        phone: request.phone.as_deref().map(validate_phone),
    })
}
