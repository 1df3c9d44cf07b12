//! Prompt Library Models
//!
//! Data structures for saved prompts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use promptbook_core::StructuredPromptInput;

/// A saved prompt: the form fields plus the generated meta prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub role: String,
    pub personality: Option<String>,
    pub instruction: String,
    pub context: Option<String>,
    pub example: Option<String>,
    pub meta_prompt: Option<String>,
    pub is_favorite: bool,
    pub usage_count: u32,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Prompt {
    /// The stored fields as compiler input.
    pub fn input(&self) -> StructuredPromptInput {
        StructuredPromptInput {
            title: Some(self.title.clone()),
            role: self.role.clone(),
            personality: self.personality.clone(),
            instruction: self.instruction.clone(),
            context: self.context.clone(),
            example: self.example.clone(),
        }
    }

    /// Case-insensitive substring match over title, fields and meta prompt.
    pub fn matches_search(&self, needle_lower: &str) -> bool {
        let optional = [
            self.personality.as_deref(),
            self.context.as_deref(),
            self.example.as_deref(),
            self.meta_prompt.as_deref(),
        ];
        [self.title.as_str(), self.role.as_str(), self.instruction.as_str()]
            .into_iter()
            .chain(optional.into_iter().flatten())
            .any(|text| text.to_lowercase().contains(needle_lower))
    }
}

/// Request to create a new prompt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptCreateRequest {
    #[serde(flatten)]
    pub input: StructuredPromptInput,
    #[serde(default)]
    pub meta_prompt: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub folder_ids: Vec<Uuid>,
}

/// A validated prompt ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrompt {
    pub title: String,
    pub input: StructuredPromptInput,
    pub meta_prompt: Option<String>,
    pub is_favorite: bool,
    /// Folders to link on insert, deduplicated
    pub folder_ids: Vec<Uuid>,
}

/// Partial update. For optional fields an empty string clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptUpdateRequest {
    pub title: Option<String>,
    pub role: Option<String>,
    pub personality: Option<String>,
    pub instruction: Option<String>,
    pub context: Option<String>,
    pub example: Option<String>,
    pub meta_prompt: Option<String>,
    pub is_favorite: Option<bool>,
}

impl PromptUpdateRequest {
    /// Apply this update on top of `existing`, returning the merged input.
    pub fn merged_input(&self, existing: &Prompt) -> StructuredPromptInput {
        fn optional(update: &Option<String>, current: &Option<String>) -> Option<String> {
            match update {
                Some(v) if v.trim().is_empty() => None,
                Some(v) => Some(v.clone()),
                None => current.clone(),
            }
        }

        StructuredPromptInput {
            title: Some(self.title.clone().unwrap_or_else(|| existing.title.clone())),
            role: self.role.clone().unwrap_or_else(|| existing.role.clone()),
            personality: optional(&self.personality, &existing.personality),
            instruction: self
                .instruction
                .clone()
                .unwrap_or_else(|| existing.instruction.clone()),
            context: optional(&self.context, &existing.context),
            example: optional(&self.example, &existing.example),
        }
    }
}

/// Sortable prompt columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptOrderBy {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    UsageCount,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Filters for listing prompts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptQuery {
    pub search: Option<String>,
    pub folder_id: Option<Uuid>,
    pub favorite: Option<bool>,
    pub order_by: Option<PromptOrderBy>,
    pub order: Option<SortDirection>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// One page of prompts and the unpaginated total
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptPage {
    pub prompts: Vec<Prompt>,
    pub total: usize,
}

/// Library statistics for a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptStats {
    pub total_prompts: usize,
    pub favorite_prompts: usize,
    pub total_folders: usize,
    pub most_used_prompt: Option<Prompt>,
}

/// Replacement set of folder assignments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderAssignmentRequest {
    pub folder_ids: Vec<Uuid>,
}
