/// LLM Client — the provider layer for every model call Tact makes.
///
/// ARCHITECTURAL RULE: No handler may call a vendor API directly.
/// Handlers go through `dispatch::Dispatcher`, which owns an ordered list of
/// the `LlmProvider` adapters defined here. Adapters make exactly one request
/// per call; retry and failover belong to the dispatcher.
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

pub mod gemini;
pub mod groq;
pub mod prompts;
#[cfg(test)]
pub mod testing;

/// Upper bound on generated tokens for every task. Parallax option sets are
/// the largest payload and fit comfortably.
pub const MAX_OUTPUT_TOKENS: u32 = 2048;
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Identity of one upstream vendor endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Groq,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "groq",
            ProviderKind::Gemini => "gemini",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} is not configured (missing API key)")]
    NotConfigured { provider: ProviderKind },

    #[error("HTTP error from {provider}: {source}")]
    Http {
        provider: ProviderKind,
        #[source]
        source: reqwest::Error,
    },

    #[error("API error from {provider} (status {status}): {message}")]
    Api {
        provider: ProviderKind,
        status: u16,
        message: String,
    },

    #[error("{provider} returned empty content")]
    EmptyContent { provider: ProviderKind },

    #[error("{provider} timed out after {secs}s")]
    Timeout { provider: ProviderKind, secs: u64 },
}

/// One vendor's chat/generation API behind a uniform text-in, text-out contract.
///
/// `call` returns the model's raw text. Extracting JSON from it is the
/// dispatcher's job, so adapters never see task schemas.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// False when the provider lacks credentials. Checked before every dispatch.
    fn is_available(&self) -> bool;

    async fn call(&self, user_prompt: &str, system_prompt: &str) -> Result<String, ProviderError>;
}

/// Builds the HTTP client shared by all adapters.
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()
}

/// Error envelope shared by both vendors: `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Pulls the vendor's error message out of a non-2xx body, falling back to the
/// (truncated) raw body.
pub(crate) fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| truncate(body, MAX_ERROR_BODY_CHARS))
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Treats an empty or whitespace-only credential as missing.
pub(crate) fn non_empty_key(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message_parses_envelope() {
        let body = r#"{"error": {"message": "Invalid API Key", "type": "invalid_request_error"}}"#;
        assert_eq!(api_error_message(body), "Invalid API Key");
    }

    #[test]
    fn test_api_error_message_falls_back_to_raw_body() {
        assert_eq!(api_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_api_error_message_truncates_long_bodies() {
        let body = "x".repeat(2000);
        let message = api_error_message(&body);
        assert_eq!(message.len(), MAX_ERROR_BODY_CHARS + 3);
        assert!(message.ends_with("..."));
    }

    #[test]
    fn test_non_empty_key_rejects_blank() {
        assert_eq!(non_empty_key(Some("   ".to_string())), None);
        assert_eq!(non_empty_key(None), None);
        assert_eq!(
            non_empty_key(Some("gsk_123".to_string())),
            Some("gsk_123".to_string())
        );
    }

    #[test]
    fn test_provider_error_names_provider() {
        let err = ProviderError::Api {
            provider: ProviderKind::Gemini,
            status: 503,
            message: "overloaded".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error from gemini (status 503): overloaded"
        );
    }
}
