//! Google Gemini wrapper (`models/{model}:generateContent`).
//!
//! Gemini receives one flattened text prompt: the system text, a
//! conversation-history marker, then one `role: content` line per turn.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::llm_client::{
    build_http_client, send_with_retry, ChatProvider, LlmError, ProviderRequest, RetryPolicy,
    MAX_OUTPUT_TOKENS,
};
use crate::models::chat::ChatTurn;

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default Gemini model; a request may override it.
pub const MODEL: &str = "gemini-2.5-flash";
const PROVIDER: &str = "Gemini";
const JSON_MIME_TYPE: &str = "application/json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> Result<String, LlmError> {
        let candidate = self
            .candidates
            .first()
            .ok_or(LlmError::EmptyContent {
                finish_reason: None,
            })?;

        let text: String = candidate
            .content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.is_empty() {
            return Err(LlmError::EmptyContent {
                finish_reason: candidate.finish_reason.clone(),
            });
        }
        Ok(text)
    }
}

/// Flattens the system text and the conversation into Gemini's single prompt.
pub fn render_prompt(system: &str, turns: &[ChatTurn]) -> String {
    let mut prompt = String::from(system);
    prompt.push_str("\n\n---CONVERSATION HISTORY---\n");
    for turn in turns {
        prompt.push_str(turn.role.as_str());
        prompt.push_str(": ");
        prompt.push_str(&turn.content);
        prompt.push('\n');
    }
    prompt
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_http_client()?,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        })
    }

    #[cfg(test)]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl ChatProvider for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: ProviderRequest<'_>) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::NotConfigured { provider: PROVIDER })?;

        let model = request.model.unwrap_or(MODEL);
        let prompt = render_prompt(request.system, request.turns);
        info!(
            "Sending message to Gemini (model={}, prompt_chars={})",
            model,
            prompt.len()
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![TextPart { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
                response_mime_type: request.json_output.then_some(JSON_MIME_TYPE),
            },
        };
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let response = send_with_retry(PROVIDER, self.retry, || {
            self.client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(&body)
        })
        .await?;

        let raw = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&raw)?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={:?}, output_tokens={:?}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        parsed.text()
    }
}
