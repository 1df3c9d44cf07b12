//! Prompt Compiler
//!
//! Renders a [`StructuredPromptInput`] into a system/user prompt pair. The
//! output is a pure function of the input and the template version, so
//! regenerating or duplicating a prompt reproduces the exact same request.

use serde::{Deserialize, Serialize};

use crate::input::StructuredPromptInput;
use crate::system_prompts::SystemPromptVersion;

/// Rendered in place of an omitted personality.
pub const PERSONALITY_FALLBACK: &str =
    "Not specified. Use a professional, clear, and helpful communication style.";

/// Rendered in place of an omitted context.
pub const CONTEXT_FALLBACK: &str =
    "Not specified. Infer reasonable domain context from the role and instruction.";

/// Rendered in place of omitted examples.
pub const EXAMPLE_FALLBACK: &str =
    "Not specified. Include illustrative examples where they clarify the expected output.";

const USER_PROMPT_PREAMBLE: &str = "Create a comprehensive meta prompt from these components:";

const USER_PROMPT_CLOSING: &str =
    "Synthesize these into a single, cohesive prompt that maximizes effectiveness.";

/// System and user prompt sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledPromptPair {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// Compile against the current system prompt template.
pub fn compile(input: &StructuredPromptInput) -> CompiledPromptPair {
    compile_with(input, SystemPromptVersion::default())
}

/// Compile against an explicit system prompt template.
pub fn compile_with(
    input: &StructuredPromptInput,
    version: SystemPromptVersion,
) -> CompiledPromptPair {
    CompiledPromptPair {
        system_prompt: version.template().to_string(),
        user_prompt: build_user_prompt(input),
    }
}

fn build_user_prompt(input: &StructuredPromptInput) -> String {
    let sections = [
        ("Role", input.role.trim()),
        (
            "Personality",
            input.personality_text().unwrap_or(PERSONALITY_FALLBACK),
        ),
        ("Instruction", input.instruction.trim()),
        ("Context", input.context_text().unwrap_or(CONTEXT_FALLBACK)),
        ("Example", input.example_text().unwrap_or(EXAMPLE_FALLBACK)),
    ];

    let body = sections
        .iter()
        .map(|(label, value)| format!("{}: {}", label, value))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{}\n\n{}\n\n{}",
        USER_PROMPT_PREAMBLE, body, USER_PROMPT_CLOSING
    )
}
