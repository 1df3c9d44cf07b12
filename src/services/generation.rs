//! Generation Service
//!
//! Orchestrates a meta-prompt generation: validate, compile, pick a
//! provider, call it. Validation failures never reach a provider. Nothing is
//! retried and there is no fallback to another provider.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use promptbook_core::{
    compile_with, validate_fields, validate_prompt_size, StructuredPromptInput,
    SystemPromptVersion, MAX_PROMPT_TOKENS,
};
use promptbook_llm::{
    collect_stream, estimate_cost, mask_secret, CompletionRequest, GenerationObserver,
    GenerationResult, LlmError, LlmResult, ProviderAdapter, ProviderKind, ProviderRegistry,
    ProviderStream, TracingObserver,
};

use crate::models::generation::{ConnectionTestResponse, EstimatedCost, KeyStatus, ValidateResponse};
use crate::utils::error::AppResult;

const TEST_SYSTEM_PROMPT: &str =
    "You are a test assistant. Reply with 'TEST_SUCCESS' to confirm connection.";
const DEFAULT_TEST_MESSAGE: &str = "Hello, this is a test";
const TEST_MAX_TOKENS: u32 = 50;

/// Per-call options
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Use the provider's streaming endpoint and reassemble the result
    pub streaming: bool,
    /// Aborts the in-flight provider call with [`LlmError::Cancelled`]
    pub cancel: Option<CancellationToken>,
}

impl GenerateOptions {
    pub fn streaming(streaming: bool) -> Self {
        Self {
            streaming,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Generation orchestrator
pub struct GenerationService {
    registry: ProviderRegistry,
    default_provider: ProviderKind,
    system_prompt: SystemPromptVersion,
    observer: Arc<dyn GenerationObserver>,
}

impl std::fmt::Debug for GenerationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationService")
            .field("registry", &self.registry)
            .field("default_provider", &self.default_provider)
            .field("system_prompt", &self.system_prompt)
            .finish_non_exhaustive()
    }
}

impl GenerationService {
    pub fn new(registry: ProviderRegistry, default_provider: ProviderKind) -> Self {
        Self {
            registry,
            default_provider,
            system_prompt: SystemPromptVersion::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn GenerationObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_system_prompt(mut self, version: SystemPromptVersion) -> Self {
        self.system_prompt = version;
        self
    }

    pub fn default_provider(&self) -> ProviderKind {
        self.default_provider
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Explicit choice, then the user's stored preference, then the default.
    pub fn resolve_provider(
        &self,
        explicit: Option<ProviderKind>,
        preferred: Option<ProviderKind>,
    ) -> ProviderKind {
        explicit.or(preferred).unwrap_or(self.default_provider)
    }

    /// Like [`resolve_provider`](Self::resolve_provider), but the stored
    /// preference is only fetched when no provider was named.
    pub async fn select_provider<F, Fut>(
        &self,
        explicit: Option<ProviderKind>,
        preferred: F,
    ) -> AppResult<ProviderKind>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<Option<ProviderKind>>>,
    {
        let preferred = match explicit {
            Some(_) => None,
            None => preferred().await?,
        };
        Ok(self.resolve_provider(explicit, preferred))
    }

    /// Generate a meta prompt from structured fields.
    pub async fn generate(
        &self,
        input: &StructuredPromptInput,
        provider: Option<ProviderKind>,
        options: GenerateOptions,
    ) -> AppResult<GenerationResult> {
        validate_fields(input)?;

        let pair = compile_with(input, self.system_prompt);
        let kind = provider.unwrap_or(self.default_provider);
        tracing::debug!(
            provider = %kind,
            user_prompt_chars = pair.user_prompt.chars().count(),
            "Compiled meta-prompt request"
        );

        self.run(kind, CompletionRequest::from_pair(&pair), options)
            .await
    }

    /// Send an arbitrary request to one provider and wait for the result.
    pub async fn complete_raw(
        &self,
        kind: ProviderKind,
        request: CompletionRequest,
    ) -> AppResult<GenerationResult> {
        self.run(kind, request, GenerateOptions::default()).await
    }

    /// Open a streaming request; the body is the provider's SSE untouched.
    pub async fn stream_raw(
        &self,
        kind: ProviderKind,
        request: CompletionRequest,
    ) -> AppResult<ProviderStream> {
        let adapter = self.registry.get(kind)?;
        self.observer.on_request(kind, adapter.model(), true);
        let started = Instant::now();

        match adapter.stream(request).await {
            Ok(stream) => Ok(stream),
            Err(err) => {
                self.observer.on_failure(kind, &err, started.elapsed());
                Err(err.into())
            }
        }
    }

    /// Validate and compile, then open a passthrough stream.
    pub async fn stream_compiled(
        &self,
        input: &StructuredPromptInput,
        provider: Option<ProviderKind>,
    ) -> AppResult<ProviderStream> {
        validate_fields(input)?;
        let pair = compile_with(input, self.system_prompt);
        let kind = provider.unwrap_or(self.default_provider);
        self.stream_raw(kind, CompletionRequest::from_pair(&pair))
            .await
    }

    async fn run(
        &self,
        kind: ProviderKind,
        request: CompletionRequest,
        options: GenerateOptions,
    ) -> AppResult<GenerationResult> {
        let adapter = self.registry.get(kind)?;
        self.observer
            .on_request(kind, adapter.model(), options.streaming);
        let started = Instant::now();

        let call = call_adapter(adapter.as_ref(), request, options.streaming);
        let outcome = match &options.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(LlmError::Cancelled),
                    result = call => result,
                }
            }
            None => call.await,
        };

        match outcome {
            Ok(result) => {
                self.observer.on_success(&result, started.elapsed());
                Ok(result)
            }
            Err(err) => {
                self.observer.on_failure(kind, &err, started.elapsed());
                Err(err.into())
            }
        }
    }

    /// Size estimate plus a rough per-provider cost. Never calls a provider.
    pub fn validate_estimate(&self, input: &StructuredPromptInput) -> ValidateResponse {
        let size = validate_prompt_size(input);
        let tokens = u32::try_from(size.estimated_tokens).unwrap_or(u32::MAX);

        ValidateResponse {
            ok: size.ok,
            estimated_tokens: size.estimated_tokens,
            max_tokens: MAX_PROMPT_TOKENS,
            reason: size.reason,
            estimated_cost: EstimatedCost {
                openai: estimate_cost(tokens, ProviderKind::OpenAI),
                gemini: estimate_cost(tokens, ProviderKind::Gemini),
            },
        }
    }

    /// Whether a key is configured, with a masked prefix only.
    pub fn key_status(&self, kind: ProviderKind) -> KeyStatus {
        match self.registry.get(kind) {
            Ok(adapter) => {
                let key = adapter.config().api_key();
                KeyStatus {
                    configured: key.is_some(),
                    key_prefix: key.map(mask_secret),
                    key_length: key.map(|k| k.chars().count()).unwrap_or(0),
                    model: adapter.model().to_string(),
                }
            }
            Err(_) => KeyStatus {
                configured: false,
                key_prefix: None,
                key_length: 0,
                model: kind.default_model().to_string(),
            },
        }
    }

    /// Round-trip a tiny request to check connectivity and credentials.
    pub async fn test_connection(
        &self,
        provider: Option<ProviderKind>,
        test_message: Option<String>,
    ) -> AppResult<ConnectionTestResponse> {
        let kind = provider.unwrap_or(self.default_provider);
        let message = test_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TEST_MESSAGE.to_string());

        let request = CompletionRequest::new(vec![
            promptbook_llm::ChatMessage::system(TEST_SYSTEM_PROMPT),
            promptbook_llm::ChatMessage::user(message),
        ])
        .with_temperature(Some(0.0))
        .with_max_tokens(Some(TEST_MAX_TOKENS));

        let result = self.complete_raw(kind, request).await?;
        let response = if result.content.trim().is_empty() {
            "No response".to_string()
        } else {
            result.content
        };

        Ok(ConnectionTestResponse {
            provider: kind,
            success: true,
            response,
            model: result.model,
            usage: result.usage,
        })
    }
}

async fn call_adapter(
    adapter: &dyn ProviderAdapter,
    request: CompletionRequest,
    streaming: bool,
) -> LlmResult<GenerationResult> {
    if streaming {
        let stream = adapter.stream(request).await?;
        collect_stream(stream, adapter.stream_adapter()).await
    } else {
        adapter.complete(request).await
    }
}
