//! LLM Provider Trait
//!
//! Defines the common interface for all LLM providers.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;

use super::types::{
    CompletionRequest, GenerationResult, LlmError, LlmResult, ProviderConfig, ProviderKind,
};
use promptbook_core::streaming::StreamAdapter;

/// Raw upstream body chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = LlmResult<Bytes>> + Send>>;

/// An in-flight streaming response. `body` yields the provider's SSE bytes
/// exactly as received.
pub struct ProviderStream {
    pub provider: ProviderKind,
    pub model: String,
    pub body: ByteStream,
}

impl std::fmt::Debug for ProviderStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderStream")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// Trait that all LLM providers must implement.
///
/// Provides a unified interface for:
/// - Buffered completions (complete)
/// - Streaming completions (stream)
/// - Translating the provider's SSE lines (stream_adapter)
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Which provider this adapter talks to.
    fn kind(&self) -> ProviderKind;

    /// Returns the model used when a request does not name one.
    fn model(&self) -> &str {
        &self.config().model
    }

    /// Get the configuration for this provider.
    fn config(&self) -> &ProviderConfig;

    /// Whether an API key is present. Calls on an unconfigured adapter fail
    /// with [`LlmError::MissingApiKey`] without touching the network.
    fn is_configured(&self) -> bool {
        self.config().api_key().is_some()
    }

    /// Send a request and wait for the complete response.
    async fn complete(&self, request: CompletionRequest) -> LlmResult<GenerationResult>;

    /// Send a streaming request. Status errors are mapped before the stream
    /// is returned; the body is passed through untouched.
    async fn stream(&self, request: CompletionRequest) -> LlmResult<ProviderStream>;

    /// A fresh adapter for this provider's stream format.
    fn stream_adapter(&self) -> Box<dyn StreamAdapter>;
}

/// Helper function to create an error for missing API key
pub fn missing_api_key_error(provider: ProviderKind) -> LlmError {
    LlmError::MissingApiKey { provider }
}

/// Pull `error.message` out of a provider error body, if there is one.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value
        .get("error")
        .and_then(|e| e.get("message").or(Some(e)))
        .and_then(|m| m.as_str())?;
    let message = message.trim();
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}

/// Helper function to map non-2xx status codes onto [`LlmError`]
pub fn parse_http_error(status: u16, body: &str, provider: ProviderKind) -> LlmError {
    let upstream_message = extract_error_message(body);
    match (status, provider) {
        (401, _) | (403, ProviderKind::Gemini) => LlmError::AuthenticationFailed {
            message: "Invalid API key".to_string(),
        },
        (429, _) => LlmError::RateLimited {
            message: "Rate limit exceeded. Please try again later.".to_string(),
        },
        (400, _) => LlmError::InvalidRequest {
            message: upstream_message
                .unwrap_or_else(|| format!("Invalid request to {}", provider.display_name())),
        },
        _ => LlmError::Upstream {
            status,
            message: upstream_message.unwrap_or_else(|| {
                format!("{} request failed with status {}", provider.display_name(), status)
            }),
        },
    }
}

/// Map a transport failure from reqwest.
pub fn network_error(err: reqwest::Error) -> LlmError {
    LlmError::NetworkError {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_error() {
        let err = missing_api_key_error(ProviderKind::Gemini);
        assert_eq!(
            err,
            LlmError::MissingApiKey {
                provider: ProviderKind::Gemini
            }
        );
    }

    #[test]
    fn test_parse_http_error() {
        let err = parse_http_error(401, "unauthorized", ProviderKind::OpenAI);
        assert!(matches!(err, LlmError::AuthenticationFailed { .. }));

        let err = parse_http_error(429, "rate limited", ProviderKind::OpenAI);
        assert!(matches!(err, LlmError::RateLimited { .. }));

        let err = parse_http_error(500, "internal error", ProviderKind::OpenAI);
        assert!(matches!(err, LlmError::Upstream { status: 500, .. }));
    }

    #[test]
    fn test_forbidden_is_auth_only_for_gemini() {
        let err = parse_http_error(403, "", ProviderKind::Gemini);
        assert!(matches!(err, LlmError::AuthenticationFailed { .. }));

        let err = parse_http_error(403, "", ProviderKind::OpenAI);
        assert!(matches!(err, LlmError::Upstream { status: 403, .. }));
    }

    #[test]
    fn test_bad_request_passes_upstream_message() {
        let body = r#"{"error":{"message":"max_tokens is too large","type":"invalid_request_error"}}"#;
        match parse_http_error(400, body, ProviderKind::OpenAI) {
            LlmError::InvalidRequest { message } => assert_eq!(message, "max_tokens is too large"),
            other => panic!("Expected InvalidRequest, got {:?}", other),
        }

        match parse_http_error(400, "not json", ProviderKind::Gemini) {
            LlmError::InvalidRequest { message } => assert_eq!(message, "Invalid request to Gemini"),
            other => panic!("Expected InvalidRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_error_message_string_error() {
        assert_eq!(
            extract_error_message(r#"{"error":"quota exhausted"}"#).as_deref(),
            Some("quota exhausted")
        );
        assert!(extract_error_message(r#"{"error":{"code":1}}"#).is_none());
        assert!(extract_error_message("").is_none());
    }
}
