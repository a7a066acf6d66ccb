//! LLM Client: the single point of entry for all upstream model calls.
//!
//! ARCHITECTURAL RULE: No other module may call a provider API directly.
//! Handlers talk to `Arc<dyn ChatProvider>`; the Gemini and OpenRouter
//! wrappers here are the only code that speaks HTTP to a provider.
//!
//! Both wrappers are built from explicit configuration; there is no global
//! client or API key.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::models::chat::ChatTurn;

pub mod gemini;
pub mod openrouter;
pub mod prompts;

pub use gemini::GeminiClient;
pub use openrouter::OpenRouterClient;

/// Upper bound on generated tokens for every provider call.
pub const MAX_OUTPUT_TOKENS: u32 = 2048;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_RETRIES: u32 = 3;
const BASE_RETRY_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content (finish_reason={})", .finish_reason.as_deref().unwrap_or("unknown"))]
    EmptyContent { finish_reason: Option<String> },

    #[error("{provider} API key is not configured")]
    NotConfigured { provider: &'static str },
}

/// Optional OpenRouter attribution headers (`HTTP-Referer`, `X-Title`).
#[derive(Debug, Clone, Default)]
pub struct Attribution {
    pub site_url: Option<String>,
    pub site_title: Option<String>,
}

/// Everything a provider needs to answer one chat request.
#[derive(Debug, Clone, Copy)]
pub struct ProviderRequest<'a> {
    /// Role prompt plus any injected facts block.
    pub system: &'a str,
    /// Conversation, oldest first, ending with the current user turn.
    pub turns: &'a [ChatTurn],
    /// Overrides the provider's default model.
    pub model: Option<&'a str>,
    pub attribution: Option<&'a Attribution>,
    /// Ask the provider for a JSON-only reply where it supports that.
    pub json_output: bool,
}

/// A chat-completion backend. Implement this to add a provider without
/// touching the handlers.
///
/// Carried in `AppState` as `Arc<dyn ChatProvider>`.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether an API key is present. Unconfigured providers fail fast.
    fn is_configured(&self) -> bool;

    /// Sends the request and returns the raw model text.
    async fn complete(&self, request: ProviderRequest<'_>) -> Result<String, LlmError>;
}

/// Backoff schedule shared by both provider wrappers.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
            base_delay: BASE_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff before `attempt` (1-based retries): base, 2×base, 4×base…
    fn delay_before(&self, attempt: u32) -> Duration {
        self.base_delay * (1 << (attempt - 1))
    }
}

pub(crate) fn build_http_client() -> Result<Client, LlmError> {
    Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Sends the request built by `build`, retrying on transport errors, 429 and
/// 5xx with exponential backoff. Returns the first successful response.
pub(crate) async fn send_with_retry<F>(
    provider: &'static str,
    policy: RetryPolicy,
    build: F,
) -> Result<Response, LlmError>
where
    F: Fn() -> RequestBuilder,
{
    let mut last_error: Option<LlmError> = None;

    for attempt in 0..policy.max_attempts {
        if attempt > 0 {
            let delay = policy.delay_before(attempt);
            warn!(
                "{} call attempt {} failed, retrying after {}ms...",
                provider,
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let response = match build().send().await {
            Ok(r) => r,
            Err(e) => {
                last_error = Some(LlmError::Http(e));
                continue;
            }
        };

        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} API returned {}: {}", provider, status, body);
            last_error = Some(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
            continue;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        return Ok(response);
    }

    Err(last_error.unwrap_or(LlmError::RateLimited {
        retries: policy.max_attempts,
    }))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(policy.delay_before(1), Duration::from_millis(100));
        assert_eq!(policy.delay_before(2), Duration::from_millis(200));
        assert_eq!(policy.delay_before(3), Duration::from_millis(400));
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_empty_content_message_includes_finish_reason() {
        let err = LlmError::EmptyContent {
            finish_reason: Some("SAFETY".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "LLM returned empty content (finish_reason=SAFETY)"
        );
        let err = LlmError::EmptyContent {
            finish_reason: None,
        };
        assert!(err.to_string().ends_with("(finish_reason=unknown)"));
    }

    #[test]
    fn test_not_configured_message() {
        let err = LlmError::NotConfigured { provider: "Gemini" };
        assert_eq!(err.to_string(), "Gemini API key is not configured");
    }
}
