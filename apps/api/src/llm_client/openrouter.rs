//! OpenRouter wrapper (OpenAI-compatible `chat/completions`).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::llm_client::{
    build_http_client, send_with_retry, ChatProvider, LlmError, ProviderRequest, RetryPolicy,
    MAX_OUTPUT_TOKENS,
};
use crate::models::chat::{Role, DEFAULT_OPENROUTER_MODEL};

pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";
const PROVIDER: &str = "OpenRouter";
/// OpenRouter provider routing preference: cheapest upstream first.
const PROVIDER_SORT: &str = "price";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    provider: ProviderRouting,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ProviderRouting {
    sort: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

impl ChatCompletionResponse {
    /// Content of the first choice's message.
    pub fn text(&self) -> Result<String, LlmError> {
        let choice = self.choices.first().ok_or(LlmError::EmptyContent {
            finish_reason: None,
        })?;
        choice
            .message
            .as_ref()
            .and_then(|m| m.content.clone())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                finish_reason: choice.finish_reason.clone(),
            })
    }
}

#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    retry: RetryPolicy,
}

impl OpenRouterClient {
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
impl ChatProvider for OpenRouterClient {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: ProviderRequest<'_>) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::NotConfigured { provider: PROVIDER })?;

        let model = request.model.unwrap_or(DEFAULT_OPENROUTER_MODEL);

        // System message first, then the caller's turns in order. Turns with
        // an unrecognised speaker have no chat-completions role and are dropped.
        let mut messages = Vec::with_capacity(request.turns.len() + 1);
        messages.push(WireMessage {
            role: "system",
            content: request.system,
        });
        messages.extend(
            request
                .turns
                .iter()
                .filter(|t| t.role != Role::Other)
                .map(|t| WireMessage {
                    role: t.role.as_str(),
                    content: &t.content,
                }),
        );

        info!(
            "Sending message to OpenRouter (model={}, messages={})",
            model,
            messages.len()
        );

        let body = ChatCompletionRequest {
            model,
            messages,
            max_tokens: MAX_OUTPUT_TOKENS,
            provider: ProviderRouting {
                sort: PROVIDER_SORT,
            },
        };
        let url = format!("{}/chat/completions", self.base_url);
        let attribution = request.attribution;

        let response = send_with_retry(PROVIDER, self.retry, || {
            let mut builder = self.client.post(&url).bearer_auth(api_key).json(&body);
            if let Some(site_url) = attribution.and_then(|a| a.site_url.as_deref()) {
                builder = builder.header("HTTP-Referer", site_url);
            }
            if let Some(site_title) = attribution.and_then(|a| a.site_title.as_deref()) {
                builder = builder.header("X-Title", site_title);
            }
            builder
        })
        .await?;

        let raw = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&raw)?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "OpenRouter call succeeded: input_tokens={}, output_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed.text()
    }
}
