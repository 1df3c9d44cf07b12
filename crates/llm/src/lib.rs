//! PromptBook LLM
//!
//! Provider abstraction and adapters for the meta-prompt generator.
//!
//! ## Module Organization
//!
//! - `types` - Provider kinds, configuration, requests, results and `LlmError`
//! - `provider` - The `ProviderAdapter` trait and HTTP error mapping
//! - `openai` / `gemini` - Concrete adapters
//! - `factory` - `create_provider` and the `ProviderRegistry`
//! - `streaming_adapters` - SSE line adapters and `collect_stream`
//! - `http_client` - reqwest client factory (proxy, timeout)
//! - `observer` - Generation observability hook and secret masking
//! - `pricing` - Cost estimation

pub mod factory;
pub mod gemini;
pub mod http_client;
pub mod observer;
pub mod openai;
pub mod pricing;
pub mod provider;
pub mod streaming_adapters;
pub mod types;

// ── Types ──────────────────────────────────────────────────────────────
pub use types::{
    ChatMessage, CompletionRequest, GenerationResult, LlmError, LlmResult, MessageRole,
    ProviderConfig, ProviderKind, TokenUsage,
};

// ── Providers ──────────────────────────────────────────────────────────
pub use factory::{create_provider, ProviderRegistry};
pub use gemini::GeminiProvider;
pub use openai::OpenAIProvider;
pub use provider::{ByteStream, ProviderAdapter, ProviderStream};

// ── Streaming ──────────────────────────────────────────────────────────
pub use streaming_adapters::{adapter_for, collect_stream};

// ── Ambient ────────────────────────────────────────────────────────────
pub use http_client::{build_http_client, HttpClientOptions};
pub use observer::{mask_secret, GenerationObserver, NoopObserver, TracingObserver};
pub use pricing::estimate_cost;
