use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::dispatch::DispatchError;

/// Fixed rejection text for callers over their request budget.
pub const RATE_LIMIT_MESSAGE: &str = "Take a deep breath. You are refining too fast.";

/// Returned for every dispatch failure. Vendor names and causes stay in the logs.
pub const DISPATCH_FAILURE_MESSAGE: &str = "Analysis failed. Please try again.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                RATE_LIMIT_MESSAGE.to_string(),
            ),
            AppError::Dispatch(e) => {
                tracing::error!("Dispatch error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    DISPATCH_FAILURE_MESSAGE.to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_maps_to_bad_request() {
        let response = AppError::Validation("Text is required.".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Text is required.");
    }

    #[tokio::test]
    async fn test_rate_limited_uses_fixed_message() {
        let response = AppError::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body_json(response).await["error"], RATE_LIMIT_MESSAGE);
    }

    #[tokio::test]
    async fn test_dispatch_failure_hides_causes() {
        let err = AppError::Dispatch(DispatchError::AllProvidersFailed {
            attempts: 2,
            causes: vec![
                "groq: API error from groq (status 401): Invalid API Key".to_string(),
                "gemini: gemini timed out after 30s".to_string(),
            ],
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], DISPATCH_FAILURE_MESSAGE);
        let text = body.to_string();
        assert!(!text.contains("groq"));
        assert!(!text.contains("gemini"));
    }
}
