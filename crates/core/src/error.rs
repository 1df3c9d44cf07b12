//! Core Error Types
//!
//! Defines the foundational error types used across the PromptBook workspace.
//! Only thiserror and serde are used here.
//!
//! The server crate extends these with HTTP-facing variants (unauthenticated,
//! not found, conflict) and provider failures from the LLM crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validation failures. Raised locally, before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// One or more fields are missing or out of bounds
    #[error("Invalid fields: {}", join_issues(.issues))]
    Fields { issues: Vec<FieldIssue> },

    /// The combined input exceeds the token ceiling
    #[error("Prompt is too long. Estimated {estimated_tokens} tokens (max {max_tokens})")]
    TooLarge {
        estimated_tokens: usize,
        max_tokens: usize,
    },

    /// Malformed request shape (bad JSON, wrong types)
    #[error("{message}")]
    Malformed { message: String },
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{} ({})", i.field, i.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    /// Create a malformed-request error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed {
            message: msg.into(),
        }
    }

    /// Create a single-field error
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fields {
            issues: vec![FieldIssue::new(field, message)],
        }
    }
}
