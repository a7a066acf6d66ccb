use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::facts::FactSet;

/// Speaker of a single chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// Only meaningful on raw OpenRouter message lists.
    System,
    /// Any other speaker label. Kept in the transcript, never scanned for facts.
    #[serde(other)]
    Other,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Other => "other",
        }
    }
}

/// One immutable turn of a conversation. An ordered `Vec<ChatTurn>` is the
/// conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[cfg(test)]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Persona the résumé assistant adopts. Unknown values fall back to `General`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    Hr,
    Educator,
    #[default]
    #[serde(other)]
    General,
}

/// Which upstream provider answers a `/api/chat` request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenRouter,
}

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub conversation_history: Vec<ChatTurn>,
    pub user_message: String,
    #[serde(default)]
    pub role: PromptRole,
    #[serde(default)]
    pub provider: ProviderKind,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub assistant_message: String,
    pub resume_data: Option<Map<String, Value>>,
}

impl ChatResponse {
    /// A reply carrying a user-visible error string and no structured data.
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            assistant_message: format!("Error: {message}"),
            resume_data: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatNormalRequest {
    #[serde(default)]
    pub conversation_history: Vec<ChatTurn>,
    pub user_message: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatNormalResponse {
    pub assistant_message: String,
}

pub const DEFAULT_OPENROUTER_MODEL: &str = "openai/gpt-oss-20b:free";

fn default_openrouter_model() -> String {
    DEFAULT_OPENROUTER_MODEL.to_string()
}

#[derive(Debug, Deserialize)]
pub struct OpenRouterRequest {
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
    #[serde(default = "default_openrouter_model")]
    pub model: String,
    pub site_url: Option<String>,
    pub site_title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactsRequest {
    #[serde(default)]
    pub conversation_history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactsResponse {
    pub facts: FactSet,
    pub facts_context: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub email: Option<bool>,
    pub phone: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_defaults() {
        let req: ChatRequest = serde_json::from_str(r#"{"userMessage": "hi"}"#).unwrap();
        assert!(req.conversation_history.is_empty());
        assert_eq!(req.role, PromptRole::General);
        assert_eq!(req.provider, ProviderKind::Gemini);
    }

    #[test]
    fn test_unknown_prompt_role_falls_back_to_general() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"userMessage": "hi", "role": "pirate"}"#).unwrap();
        assert_eq!(req.role, PromptRole::General);
    }

    #[test]
    fn test_chat_request_camel_case_history() {
        let req: ChatRequest = serde_json::from_str(
            r#"{
                "conversationHistory": [
                    {"role": "assistant", "content": "What is your name?"},
                    {"role": "user", "content": "Jane"}
                ],
                "userMessage": "jane@example.com",
                "role": "hr",
                "provider": "openrouter"
            }"#,
        )
        .unwrap();
        assert_eq!(req.conversation_history.len(), 2);
        assert_eq!(req.conversation_history[0].role, Role::Assistant);
        assert_eq!(req.role, PromptRole::Hr);
        assert_eq!(req.provider, ProviderKind::OpenRouter);
    }

    #[test]
    fn test_unknown_turn_role_is_other() {
        let req: ChatRequest = serde_json::from_str(
            r#"{
                "conversationHistory": [{"role": "bot", "content": "Hello there"}],
                "userMessage": "hi"
            }"#,
        )
        .unwrap();
        assert_eq!(req.conversation_history[0].role, Role::Other);
        assert_eq!(req.conversation_history[0].content, "Hello there");
    }

    #[test]
    fn test_chat_response_serializes_camel_case_with_null_data() {
        let json = serde_json::to_value(ChatResponse::error("boom")).unwrap();
        assert_eq!(json["assistantMessage"], "Error: boom");
        assert!(json["resumeData"].is_null());
    }

    #[test]
    fn test_openrouter_request_default_model() {
        let req: OpenRouterRequest = serde_json::from_str(r#"{"messages": []}"#).unwrap();
        assert_eq!(req.model, DEFAULT_OPENROUTER_MODEL);
        assert!(req.site_url.is_none());
    }
}
