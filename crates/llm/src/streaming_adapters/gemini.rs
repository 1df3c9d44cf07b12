//! Gemini SSE Stream Adapter
//!
//! Handles `:streamGenerateContent?alt=sse`, where every `data:` line is a
//! complete `GenerateContentResponse`. Gemini sends no `[DONE]` marker; the
//! final chunk carries `finishReason` and `usageMetadata`.

use promptbook_core::streaming::{sse_data, AdapterError, StreamAdapter, UnifiedStreamEvent};
use serde::Deserialize;

use crate::gemini::{SAFETY_BLOCKED_MESSAGE, SAFETY_FINISH_REASON};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    error: Option<ChunkError>,
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

#[derive(Debug, Deserialize)]
struct ChunkError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Adapter for Gemini SSE chunks
#[derive(Debug, Default)]
pub struct GeminiAdapter {
    model_reported: bool,
}

impl GeminiAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn safety_block() -> UnifiedStreamEvent {
    UnifiedStreamEvent::Error {
        message: SAFETY_BLOCKED_MESSAGE.to_string(),
        code: Some(SAFETY_FINISH_REASON.to_string()),
    }
}

impl StreamAdapter for GeminiAdapter {
    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn adapt(&mut self, input: &str) -> Result<Vec<UnifiedStreamEvent>, AdapterError> {
        let Some(payload) = sse_data(input.trim()) else {
            return Ok(vec![]);
        };
        let payload = payload.trim();
        if payload.is_empty() {
            return Ok(vec![]);
        }

        let chunk: GeminiChunk =
            serde_json::from_str(payload).map_err(|e| AdapterError::ParseError(e.to_string()))?;

        if let Some(error) = chunk.error {
            return Ok(vec![UnifiedStreamEvent::Error {
                message: error
                    .message
                    .unwrap_or_else(|| "Gemini stream error".to_string()),
                code: error.status,
            }]);
        }

        if chunk
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .is_some()
        {
            return Ok(vec![safety_block()]);
        }

        let mut events = vec![];

        if let Some(model) = chunk.model_version {
            if !self.model_reported {
                self.model_reported = true;
                events.push(UnifiedStreamEvent::Model { name: model });
            }
        }

        if let Some(candidate) = chunk.candidates.into_iter().next() {
            if candidate.finish_reason.as_deref() == Some(SAFETY_FINISH_REASON) {
                events.push(safety_block());
                return Ok(events);
            }

            let text: String = candidate
                .content
                .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
                .unwrap_or_default();
            if !text.is_empty() {
                events.push(UnifiedStreamEvent::TextDelta { content: text });
            }

            if let Some(usage) = chunk.usage_metadata {
                events.push(UnifiedStreamEvent::Usage {
                    prompt_tokens: usage.prompt_token_count,
                    completion_tokens: usage.candidates_token_count,
                    total_tokens: usage.total_token_count,
                });
            }

            if let Some(reason) = candidate.finish_reason {
                events.push(UnifiedStreamEvent::Complete {
                    stop_reason: Some(reason),
                });
            }
        } else if let Some(usage) = chunk.usage_metadata {
            events.push(UnifiedStreamEvent::Usage {
                prompt_tokens: usage.prompt_token_count,
                completion_tokens: usage.candidates_token_count,
                total_tokens: usage.total_token_count,
            });
        }

        Ok(events)
    }

    fn reset(&mut self) {
        self.model_reported = false;
    }
}
