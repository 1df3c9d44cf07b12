//! Field Validation
//!
//! Size and shape checks run before every generation attempt. Everything here
//! is pure: no I/O, no clock, no shared state.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{FieldIssue, ValidationError};
use crate::input::StructuredPromptInput;

/// Ceiling on the estimated token count of the combined fields.
pub const MAX_PROMPT_TOKENS: usize = 4000;

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_ROLE_CHARS: usize = 500;
pub const MAX_PERSONALITY_CHARS: usize = 500;
pub const MAX_INSTRUCTION_CHARS: usize = 2000;
pub const MAX_CONTEXT_CHARS: usize = 2000;
pub const MAX_EXAMPLE_CHARS: usize = 2000;

pub const MAX_FOLDER_NAME_CHARS: usize = 50;
pub const MAX_FOLDER_DESCRIPTION_CHARS: usize = 200;
pub const MAX_SEARCH_QUERY_CHARS: usize = 100;

/// Colors a folder may be tagged with.
pub const FOLDER_COLORS: [&str; 8] = [
    "red", "blue", "green", "yellow", "purple", "pink", "indigo", "gray",
];

pub const DEFAULT_FOLDER_COLOR: &str = "blue";

/// Outcome of the size check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeCheck {
    pub ok: bool,
    pub estimated_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Rough token estimate: one token per four characters, rounded up.
pub fn estimate_token_count(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Check the combined size of the five fields against [`MAX_PROMPT_TOKENS`].
pub fn validate_prompt_size(input: &StructuredPromptInput) -> SizeCheck {
    let estimated_tokens = estimate_token_count(&input.combined_text());

    if estimated_tokens > MAX_PROMPT_TOKENS {
        SizeCheck {
            ok: false,
            estimated_tokens,
            reason: Some(format!(
                "Prompt is too long. Estimated {} tokens (max {})",
                estimated_tokens, MAX_PROMPT_TOKENS
            )),
        }
    } else {
        SizeCheck {
            ok: true,
            estimated_tokens,
            reason: None,
        }
    }
}

/// Validate the overall size, required fields, and per-field bounds.
///
/// The size ceiling is checked first so oversize input is always reported as
/// [`ValidationError::TooLarge`]; field issues are then reported together.
pub fn validate_fields(input: &StructuredPromptInput) -> Result<SizeCheck, ValidationError> {
    let size = validate_prompt_size(input);
    if !size.ok {
        return Err(ValidationError::TooLarge {
            estimated_tokens: size.estimated_tokens,
            max_tokens: MAX_PROMPT_TOKENS,
        });
    }

    let mut issues = Vec::new();

    require(&mut issues, "role", &input.role, "Role is required");
    require(
        &mut issues,
        "instruction",
        &input.instruction,
        "Instructions are required",
    );

    if let Some(title) = &input.title {
        bound(&mut issues, "title", title, MAX_TITLE_CHARS, "Title");
    }
    bound(&mut issues, "role", &input.role, MAX_ROLE_CHARS, "Role");
    if let Some(personality) = &input.personality {
        bound(
            &mut issues,
            "personality",
            personality,
            MAX_PERSONALITY_CHARS,
            "Personality",
        );
    }
    bound(
        &mut issues,
        "instruction",
        &input.instruction,
        MAX_INSTRUCTION_CHARS,
        "Instructions",
    );
    if let Some(context) = &input.context {
        bound(&mut issues, "context", context, MAX_CONTEXT_CHARS, "Context");
    }
    if let Some(example) = &input.example {
        bound(&mut issues, "example", example, MAX_EXAMPLE_CHARS, "Examples");
    }

    if !issues.is_empty() {
        return Err(ValidationError::Fields { issues });
    }

    Ok(size)
}

/// Title is optional for generation but required when a prompt is saved.
pub fn validate_title(title: Option<&str>) -> Result<String, ValidationError> {
    let title = title.map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(ValidationError::field("title", "Title is required"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ValidationError::field(
            "title",
            format!("Title must be less than {} characters", MAX_TITLE_CHARS),
        ));
    }
    Ok(title.to_string())
}

fn folder_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9\s\-_]+$").expect("static folder pattern"))
}

/// Validate folder fields. Returns the normalized color.
pub fn validate_folder(
    name: &str,
    description: Option<&str>,
    color: Option<&str>,
) -> Result<String, ValidationError> {
    let mut issues = Vec::new();

    let trimmed = name.trim();
    if trimmed.is_empty() {
        issues.push(FieldIssue::new("name", "Folder name is required"));
    } else if trimmed.chars().count() > MAX_FOLDER_NAME_CHARS {
        issues.push(FieldIssue::new(
            "name",
            format!(
                "Folder name must be less than {} characters",
                MAX_FOLDER_NAME_CHARS
            ),
        ));
    } else if !folder_name_pattern().is_match(trimmed) {
        issues.push(FieldIssue::new(
            "name",
            "Folder name can only contain letters, numbers, spaces, hyphens, and underscores",
        ));
    }

    if let Some(desc) = description {
        if desc.chars().count() > MAX_FOLDER_DESCRIPTION_CHARS {
            issues.push(FieldIssue::new(
                "description",
                format!(
                    "Description must be less than {} characters",
                    MAX_FOLDER_DESCRIPTION_CHARS
                ),
            ));
        }
    }

    let color = color.unwrap_or(DEFAULT_FOLDER_COLOR);
    if !FOLDER_COLORS.contains(&color) {
        issues.push(FieldIssue::new(
            "color",
            format!("Color must be one of: {}", FOLDER_COLORS.join(", ")),
        ));
    }

    if issues.is_empty() {
        Ok(color.to_string())
    } else {
        Err(ValidationError::Fields { issues })
    }
}

/// Validate a free-text search query. Returns the trimmed query.
pub fn validate_search_query(query: &str) -> Result<String, ValidationError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::field("search", "Search query is required"));
    }
    if trimmed.chars().count() > MAX_SEARCH_QUERY_CHARS {
        return Err(ValidationError::field("search", "Search query is too long"));
    }
    Ok(trimmed.to_string())
}

fn require(issues: &mut Vec<FieldIssue>, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        issues.push(FieldIssue::new(field, message));
    }
}

fn bound(issues: &mut Vec<FieldIssue>, field: &str, value: &str, max: usize, label: &str) {
    if value.chars().count() > max {
        issues.push(FieldIssue::new(
            field,
            format!("{} must be less than {} characters", label, max),
        ));
    }
}
