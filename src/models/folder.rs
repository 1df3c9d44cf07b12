//! Folder Models
//!
//! Folders group saved prompts; a prompt may sit in several folders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::prompt::SortDirection;

/// A user's folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    /// One of the fixed palette names (`red`, `blue`, ...)
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Folder with the number of prompts assigned to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderWithCount {
    #[serde(flatten)]
    pub folder: Folder,
    pub prompt_count: usize,
}

/// Request to create a folder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderCreateRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// Partial folder update. An empty description clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// A validated folder ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFolder {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
}

/// Sortable folder columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderOrderBy {
    #[default]
    Name,
    CreatedAt,
    UpdatedAt,
}

/// Filters for listing folders
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderQuery {
    pub search: Option<String>,
    pub order_by: Option<FolderOrderBy>,
    pub order: Option<SortDirection>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}
