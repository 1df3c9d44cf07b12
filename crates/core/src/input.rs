//! Structured Prompt Input
//!
//! The five form fields a user fills in, plus an optional title.

use serde::{Deserialize, Serialize};

/// Structured fields submitted for meta-prompt generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredPromptInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
    #[serde(default)]
    pub instruction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl StructuredPromptInput {
    /// Create an input with only the required fields set
    pub fn new(role: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            instruction: instruction.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = Some(personality.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Optional fields with blank values are treated as absent.
    pub fn personality_text(&self) -> Option<&str> {
        non_blank(self.personality.as_deref())
    }

    pub fn context_text(&self) -> Option<&str> {
        non_blank(self.context.as_deref())
    }

    pub fn example_text(&self) -> Option<&str> {
        non_blank(self.example.as_deref())
    }

    /// Concatenation used for token estimation: the five fields joined by a
    /// single space, absent optional fields contributing an empty string.
    pub fn combined_text(&self) -> String {
        [
            self.role.as_str(),
            self.personality.as_deref().unwrap_or(""),
            self.instruction.as_str(),
            self.context.as_deref().unwrap_or(""),
            self.example.as_deref().unwrap_or(""),
        ]
        .join(" ")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
