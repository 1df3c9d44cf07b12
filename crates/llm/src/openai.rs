//! OpenAI Provider
//!
//! Implementation of the ProviderAdapter trait for OpenAI's chat completions API.

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Deserialize;

use super::provider::{
    missing_api_key_error, network_error, parse_http_error, ProviderAdapter, ProviderStream,
};
use super::types::{
    CompletionRequest, GenerationResult, LlmError, LlmResult, ProviderConfig, ProviderKind,
    TokenUsage,
};
use crate::http_client::{build_http_client, HttpClientOptions};
use crate::streaming_adapters::OpenAIAdapter;
use promptbook_core::streaming::StreamAdapter;

/// Default OpenAI API endpoint
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI provider
pub struct OpenAIProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with the given configuration
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let client = build_http_client(&HttpClientOptions::from(&config))?;
        Ok(Self { config, client })
    }

    /// Get the API endpoint
    fn base_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(OPENAI_API_URL)
    }

    fn resolve_model(&self, request: &CompletionRequest) -> String {
        request
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.config.model.clone())
    }

    /// Build the request body for the API
    fn build_request_body(
        &self,
        request: &CompletionRequest,
        model: &str,
        stream: bool,
    ) -> serde_json::Value {
        serde_json::json!({
            "model": model,
            "messages": request.messages,
            "temperature": request.temperature.unwrap_or(self.config.temperature),
            "max_tokens": request.max_tokens.unwrap_or(self.config.max_tokens),
            "stream": stream,
        })
    }

    /// POST the request; non-2xx statuses are mapped to errors here.
    async fn send(
        &self,
        request: &CompletionRequest,
        model: &str,
        stream: bool,
    ) -> LlmResult<reqwest::Response> {
        let api_key = self
            .config
            .api_key()
            .ok_or_else(|| missing_api_key_error(ProviderKind::OpenAI))?;

        let body = self.build_request_body(request, model, stream);
        tracing::debug!(model, stream, "Sending OpenAI request");

        let response = self
            .client
            .post(self.base_url())
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "OpenAI request failed");
            return Err(parse_http_error(
                status.as_u16(),
                &body_text,
                ProviderKind::OpenAI,
            ));
        }
        Ok(response)
    }

    fn parse_response(&self, response: OpenAIResponse, requested_model: String) -> GenerationResult {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();

        GenerationResult {
            content,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            model: response.model.unwrap_or(requested_model),
            provider: ProviderKind::OpenAI,
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAIProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<GenerationResult> {
        let model = self.resolve_model(&request);
        let response = self.send(&request, &model, false).await?;

        let body_text = response.text().await.map_err(network_error)?;
        let openai_response: OpenAIResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok(self.parse_response(openai_response, model))
    }

    async fn stream(&self, request: CompletionRequest) -> LlmResult<ProviderStream> {
        let model = self.resolve_model(&request);
        let response = self.send(&request, &model, true).await?;

        Ok(ProviderStream {
            provider: ProviderKind::OpenAI,
            model,
            body: Box::pin(response.bytes_stream().map(|r| r.map_err(network_error))),
        })
    }

    fn stream_adapter(&self) -> Box<dyn StreamAdapter> {
        Box::new(OpenAIAdapter::new())
    }
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<ResponseUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseUsage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
    #[serde(default)]
    total_tokens: Option<u32>,
}
