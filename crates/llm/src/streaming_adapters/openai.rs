//! OpenAI SSE Stream Adapter
//!
//! Handles the chat completions chunk format:
//! `data: {"choices":[{"delta":{"content":"..."},"finish_reason":null}]}` lines
//! terminated by `data: [DONE]`.

use promptbook_core::streaming::{sse_data, AdapterError, StreamAdapter, UnifiedStreamEvent};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct OpenAIChunk {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    error: Option<ChunkError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Option<Delta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
    #[serde(default)]
    total_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChunkError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
}

/// Adapter for OpenAI chat completion chunks
#[derive(Debug, Default)]
pub struct OpenAIAdapter {
    model_reported: bool,
    completed: bool,
}

impl OpenAIAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StreamAdapter for OpenAIAdapter {
    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn adapt(&mut self, input: &str) -> Result<Vec<UnifiedStreamEvent>, AdapterError> {
        let Some(payload) = sse_data(input.trim()) else {
            return Ok(vec![]);
        };
        let payload = payload.trim();

        if payload.is_empty() {
            return Ok(vec![]);
        }
        if payload == "[DONE]" {
            if self.completed {
                return Ok(vec![]);
            }
            self.completed = true;
            return Ok(vec![UnifiedStreamEvent::Complete { stop_reason: None }]);
        }

        let chunk: OpenAIChunk =
            serde_json::from_str(payload).map_err(|e| AdapterError::ParseError(e.to_string()))?;

        let mut events = vec![];

        if let Some(error) = chunk.error {
            events.push(UnifiedStreamEvent::Error {
                message: error
                    .message
                    .unwrap_or_else(|| "OpenAI stream error".to_string()),
                code: error.error_type,
            });
            return Ok(events);
        }

        if let Some(model) = chunk.model {
            if !self.model_reported {
                self.model_reported = true;
                events.push(UnifiedStreamEvent::Model { name: model });
            }
        }

        for choice in chunk.choices {
            if let Some(content) = choice.delta.and_then(|d| d.content) {
                if !content.is_empty() {
                    events.push(UnifiedStreamEvent::TextDelta { content });
                }
            }
            if let Some(finish_reason) = choice.finish_reason {
                self.completed = true;
                events.push(UnifiedStreamEvent::Complete {
                    stop_reason: Some(finish_reason),
                });
            }
        }

        // Sent on the final chunk when `stream_options.include_usage` is set
        if let Some(usage) = chunk.usage {
            events.push(UnifiedStreamEvent::Usage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            });
        }

        Ok(events)
    }

    fn reset(&mut self) {
        self.model_reported = false;
        self.completed = false;
    }
}
