//! Gemini Provider
//!
//! Implementation of the ProviderAdapter trait for Google's Generative
//! Language API. The API key travels as the `key` query parameter, and the
//! system and user messages are merged into a single text part.

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Deserialize;
use url::Url;

use super::provider::{
    missing_api_key_error, network_error, parse_http_error, ProviderAdapter, ProviderStream,
};
use super::types::{
    CompletionRequest, GenerationResult, LlmError, LlmResult, ProviderConfig, ProviderKind,
    TokenUsage,
};
use crate::http_client::{build_http_client, HttpClientOptions};
use crate::streaming_adapters::GeminiAdapter;
use promptbook_core::streaming::StreamAdapter;

/// Default Gemini models endpoint
pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// `finishReason` reported when a candidate is blocked.
pub const SAFETY_FINISH_REASON: &str = "SAFETY";

pub const SAFETY_BLOCKED_MESSAGE: &str =
    "Content was blocked by safety filters. Please modify your prompt.";

pub const NO_CONTENT_MESSAGE: &str = "No content was generated";

const TOP_K: u32 = 40;
const TOP_P: f64 = 0.95;

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

/// Model names become a path segment of the request URL, so only plain
/// names are accepted.
fn validate_model_name(model: &str) -> LlmResult<()> {
    let plain = model
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if model.is_empty() || !plain || model.chars().all(|c| c == '.') {
        return Err(LlmError::InvalidRequest {
            message: format!("Invalid Gemini model name: '{}'", model),
        });
    }
    Ok(())
}

/// Gemini provider
pub struct GeminiProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider with the given configuration
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let client = build_http_client(&HttpClientOptions::from(&config))?;
        Ok(Self { config, client })
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(GEMINI_API_URL)
            .trim_end_matches('/')
    }

    fn resolve_model(&self, request: &CompletionRequest) -> String {
        request
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.config.model.clone())
    }

    /// `{base}/{model}:{method}?key=...`
    fn endpoint(&self, model: &str, api_key: &str, stream: bool) -> LlmResult<Url> {
        validate_model_name(model)?;
        let method = if stream {
            "streamGenerateContent"
        } else {
            "generateContent"
        };
        let mut url = Url::parse(&format!("{}/{}:{}", self.base_url(), model, method)).map_err(
            |e| LlmError::InvalidRequest {
                message: format!("Invalid Gemini endpoint: {}", e),
            },
        )?;
        {
            let mut query = url.query_pairs_mut();
            if stream {
                query.append_pair("alt", "sse");
            }
            query.append_pair("key", api_key);
        }
        Ok(url)
    }

    /// Build the request body for the API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let safety_settings: Vec<serde_json::Value> = SAFETY_CATEGORIES
            .iter()
            .map(|category| {
                serde_json::json!({
                    "category": category,
                    "threshold": SAFETY_THRESHOLD,
                })
            })
            .collect();

        serde_json::json!({
            "contents": [{
                "parts": [{ "text": request.flattened_text() }]
            }],
            "generationConfig": {
                "temperature": request.temperature.unwrap_or(self.config.temperature),
                "maxOutputTokens": request.max_tokens.unwrap_or(self.config.max_tokens),
                "topK": TOP_K,
                "topP": TOP_P,
            },
            "safetySettings": safety_settings,
        })
    }

    async fn send(
        &self,
        request: &CompletionRequest,
        model: &str,
        stream: bool,
    ) -> LlmResult<reqwest::Response> {
        let api_key = self
            .config
            .api_key()
            .ok_or_else(|| missing_api_key_error(ProviderKind::Gemini))?;

        let url = self.endpoint(model, api_key, stream)?;
        let body = self.build_request_body(request);
        tracing::debug!(model, stream, "Sending Gemini request");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            // reqwest includes the URL (and with it the key) in its error text
            .map_err(|e| network_error(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Gemini request failed");
            return Err(parse_http_error(
                status.as_u16(),
                &body_text,
                ProviderKind::Gemini,
            ));
        }
        Ok(response)
    }

    fn parse_response(&self, response: GeminiResponse, model: String) -> LlmResult<GenerationResult> {
        if response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_ref())
            .is_some()
        {
            return Err(LlmError::ContentBlocked {
                message: SAFETY_BLOCKED_MESSAGE.to_string(),
            });
        }

        let candidate = response.candidates.into_iter().next();
        if candidate.as_ref().and_then(|c| c.finish_reason.as_deref()) == Some(SAFETY_FINISH_REASON)
        {
            return Err(LlmError::ContentBlocked {
                message: SAFETY_BLOCKED_MESSAGE.to_string(),
            });
        }

        let content = candidate
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| LlmError::NoContent {
                message: NO_CONTENT_MESSAGE.to_string(),
            })?;

        Ok(GenerationResult {
            content,
            usage: response.usage_metadata.map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            }),
            model,
            provider: ProviderKind::Gemini,
        })
    }
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<GenerationResult> {
        let model = self.resolve_model(&request);
        let response = self.send(&request, &model, false).await?;

        let body_text = response
            .text()
            .await
            .map_err(|e| network_error(e.without_url()))?;
        let gemini_response: GeminiResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })?;

        self.parse_response(gemini_response, model)
    }

    async fn stream(&self, request: CompletionRequest) -> LlmResult<ProviderStream> {
        let model = self.resolve_model(&request);
        let response = self.send(&request, &model, true).await?;

        Ok(ProviderStream {
            provider: ProviderKind::Gemini,
            model,
            body: Box::pin(
                response
                    .bytes_stream()
                    .map(|r| r.map_err(|e| network_error(e.without_url()))),
            ),
        })
    }

    fn stream_adapter(&self) -> Box<dyn StreamAdapter> {
        Box::new(GeminiAdapter::new())
    }
}

/// Gemini API response format
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
    #[serde(default)]
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}
