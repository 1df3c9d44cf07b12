//! Generation Observer
//!
//! Hook invoked around every provider call. The default implementation
//! emits `tracing` events; API keys only ever appear through [`mask_secret`].

use std::time::Duration;

use crate::types::{GenerationResult, LlmError, ProviderKind};

/// Callbacks around a provider call.
pub trait GenerationObserver: Send + Sync {
    fn on_request(&self, _provider: ProviderKind, _model: &str, _streaming: bool) {}

    fn on_success(&self, _result: &GenerationResult, _elapsed: Duration) {}

    fn on_failure(&self, _provider: ProviderKind, _error: &LlmError, _elapsed: Duration) {}
}

/// Logs every call through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl GenerationObserver for TracingObserver {
    fn on_request(&self, provider: ProviderKind, model: &str, streaming: bool) {
        tracing::info!(%provider, model, streaming, "Generation started");
    }

    fn on_success(&self, result: &GenerationResult, elapsed: Duration) {
        let usage = result.usage.clone().unwrap_or_default();
        tracing::info!(
            provider = %result.provider,
            model = %result.model,
            elapsed_ms = elapsed.as_millis() as u64,
            content_chars = result.content.chars().count(),
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "Generation completed"
        );
    }

    fn on_failure(&self, provider: ProviderKind, error: &LlmError, elapsed: Duration) {
        tracing::warn!(
            %provider,
            elapsed_ms = elapsed.as_millis() as u64,
            error = %error,
            "Generation failed"
        );
    }
}

/// Does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl GenerationObserver for NoopObserver {}

/// Visible prefix of a secret: the first 6 characters followed by `...` for
/// keys of 12 characters or more, otherwise `***`.
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() < 12 {
        return "***".to_string();
    }
    let prefix: String = secret.chars().take(6).collect();
    format!("{}...", prefix)
}
