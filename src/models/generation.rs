//! Generation Models
//!
//! Request and response bodies for meta-prompt generation and the raw
//! provider routes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use promptbook_core::StructuredPromptInput;
use promptbook_llm::{ChatMessage, ProviderKind, TokenUsage};

/// Body of `POST /api/prompts/generate`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(flatten)]
    pub input: StructuredPromptInput,
    #[serde(default)]
    pub provider: Option<ProviderKind>,
    /// Use the provider's streaming endpoint and reassemble the result
    #[serde(default)]
    pub stream: bool,
    /// Store the result in the caller's library
    #[serde(default)]
    pub save: bool,
    #[serde(default)]
    pub folder_ids: Vec<Uuid>,
}

/// Result of a generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub meta_prompt: String,
    pub provider: ProviderKind,
    pub usage: Option<TokenUsage>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<Uuid>,
}

/// Provider override for regeneration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateRequest {
    #[serde(default)]
    pub provider: Option<ProviderKind>,
    #[serde(default)]
    pub stream: bool,
}

/// Rough cost per provider, in USD
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatedCost {
    pub openai: f64,
    pub gemini: f64,
}

/// Result of `POST /api/prompts/validate`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub ok: bool,
    pub estimated_tokens: usize,
    pub max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub estimated_cost: EstimatedCost,
}

/// Body of `POST /api/llm/openai`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAiChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub stream: bool,
}

/// Body of `POST /api/llm/gemini`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerateRequest {
    #[serde(default)]
    pub prompt: String,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
    #[serde(default)]
    pub stream: bool,
}

/// Buffered response of the raw provider routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub usage: Option<TokenUsage>,
    pub model: String,
}

/// Whether a provider key is configured; never includes the key itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyStatus {
    pub configured: bool,
    pub key_prefix: Option<String>,
    pub key_length: usize,
    pub model: String,
}

/// Result of `GET /api/llm/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatusResponse {
    pub openai: KeyStatus,
    pub gemini: KeyStatus,
    pub default_provider: ProviderKind,
}

/// Body of `POST /api/llm/test`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTestRequest {
    pub provider: Option<ProviderKind>,
    pub test_message: Option<String>,
}

/// Result of a connectivity test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTestResponse {
    pub provider: ProviderKind,
    pub success: bool,
    pub response: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}
