use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                let message = match e {
                    LlmError::NotConfigured { .. } => e.to_string(),
                    _ => "An AI processing error occurred".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, "LLM_ERROR", message)
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_maps_to_400() {
        let (status, body) = render(AppError::Validation("userMessage cannot be empty".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "userMessage cannot be empty");
    }

    #[tokio::test]
    async fn test_llm_error_is_not_echoed() {
        let err = LlmError::Api {
            status: 401,
            message: "invalid key sk-secret".into(),
        };
        let (status, body) = render(AppError::from(err)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "LLM_ERROR");
        assert!(!body["error"]["message"].as_str().unwrap().contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_missing_key_is_reported() {
        let err = LlmError::NotConfigured {
            provider: "OpenRouter",
        };
        let (_, body) = render(AppError::from(err)).await;
        assert_eq!(
            body["error"]["message"],
            "OpenRouter API key is not configured"
        );
    }

    #[tokio::test]
    async fn test_not_found() {
        let (status, body) = render(AppError::NotFound("No route for /nope".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
