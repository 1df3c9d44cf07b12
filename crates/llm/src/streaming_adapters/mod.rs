//! Provider-Specific Stream Adapters
//!
//! Each adapter handles the unique streaming format of its provider.
//! [`collect_stream`] drives an adapter over a raw provider stream and folds
//! the events into a single [`GenerationResult`].

pub mod gemini;
pub mod openai;

pub use gemini::GeminiAdapter;
pub use openai::OpenAIAdapter;

use futures_util::StreamExt;
use promptbook_core::streaming::{SseLineBuffer, StreamAdapter, UnifiedStreamEvent};

use crate::gemini::{NO_CONTENT_MESSAGE, SAFETY_FINISH_REASON};
use crate::provider::ProviderStream;
use crate::types::{GenerationResult, LlmError, LlmResult, ProviderKind, TokenUsage};

/// Create the stream adapter for a provider.
pub fn adapter_for(kind: ProviderKind) -> Box<dyn StreamAdapter> {
    match kind {
        ProviderKind::OpenAI => Box::new(OpenAIAdapter::new()),
        ProviderKind::Gemini => Box::new(GeminiAdapter::new()),
    }
}

/// Accumulates unified events into a result.
#[derive(Debug)]
struct StreamCollector {
    provider: ProviderKind,
    model: String,
    content: String,
    usage: Option<TokenUsage>,
}

impl StreamCollector {
    fn new(provider: ProviderKind, model: String) -> Self {
        Self {
            provider,
            model,
            content: String::new(),
            usage: None,
        }
    }

    fn apply(&mut self, event: UnifiedStreamEvent) -> LlmResult<()> {
        match event {
            UnifiedStreamEvent::TextDelta { content } => self.content.push_str(&content),
            UnifiedStreamEvent::Usage {
                prompt_tokens,
                completion_tokens,
                total_tokens,
            } => {
                self.usage = Some(TokenUsage {
                    prompt_tokens,
                    completion_tokens,
                    total_tokens,
                });
            }
            UnifiedStreamEvent::Model { name } => self.model = name,
            UnifiedStreamEvent::Error { message, code } => {
                return Err(if code.as_deref() == Some(SAFETY_FINISH_REASON) {
                    LlmError::ContentBlocked { message }
                } else {
                    LlmError::Upstream {
                        status: 502,
                        message,
                    }
                });
            }
            UnifiedStreamEvent::Complete { .. } => {}
        }
        Ok(())
    }

    fn feed(&mut self, adapter: &mut dyn StreamAdapter, line: &str) -> LlmResult<()> {
        match adapter.adapt(line) {
            Ok(events) => {
                for event in events {
                    self.apply(event)?;
                }
            }
            Err(e) => {
                tracing::warn!(
                    provider = adapter.provider_name(),
                    error = %e,
                    "Skipping unparseable stream line"
                );
            }
        }
        Ok(())
    }

    fn finish(self) -> LlmResult<GenerationResult> {
        if self.content.is_empty() && self.provider.requires_content() {
            return Err(LlmError::NoContent {
                message: NO_CONTENT_MESSAGE.to_string(),
            });
        }
        Ok(GenerationResult {
            content: self.content,
            usage: self.usage,
            model: self.model,
            provider: self.provider,
        })
    }
}

/// Drain a provider stream through `adapter` and return the assembled result.
///
/// Transport errors and in-stream error events abort collection; lines the
/// adapter cannot parse are logged and skipped.
pub async fn collect_stream(
    stream: ProviderStream,
    mut adapter: Box<dyn StreamAdapter>,
) -> LlmResult<GenerationResult> {
    let ProviderStream {
        provider,
        model,
        mut body,
    } = stream;

    adapter.reset();
    let mut lines = SseLineBuffer::new();
    let mut collector = StreamCollector::new(provider, model);

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        for line in lines.push(&chunk) {
            collector.feed(adapter.as_mut(), &line)?;
        }
    }
    if let Some(line) = lines.finish() {
        collector.feed(adapter.as_mut(), &line)?;
    }

    collector.finish()
}
