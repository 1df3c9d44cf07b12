//! PromptBook Core
//!
//! Foundational types for the PromptBook workspace. This crate has zero
//! dependencies on the HTTP server or on any LLM provider.
//!
//! ## Module Organization
//!
//! - `error` - Validation error types (`ValidationError`, `FieldIssue`)
//! - `input` - The structured form fields (`StructuredPromptInput`)
//! - `validation` - Field Validator: size and shape checks, token estimation
//! - `compiler` - Prompt Compiler: deterministic system/user prompt rendering
//! - `system_prompts` - Versioned system prompt templates
//! - `streaming` - Unified stream event types, adapter trait, SSE line splitting

pub mod compiler;
pub mod error;
pub mod input;
pub mod streaming;
pub mod system_prompts;
pub mod validation;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{FieldIssue, ValidationError};

// ── Input & Compilation ────────────────────────────────────────────────
pub use compiler::{compile, compile_with, CompiledPromptPair};
pub use input::StructuredPromptInput;
pub use system_prompts::SystemPromptVersion;
pub use validation::{
    estimate_token_count, validate_fields, validate_prompt_size, SizeCheck, MAX_PROMPT_TOKENS,
};

// ── Streaming Types ────────────────────────────────────────────────────
pub use streaming::{sse_data, AdapterError, SseLineBuffer, StreamAdapter, UnifiedStreamEvent};
