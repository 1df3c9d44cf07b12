//! Persistence Gateway
//!
//! Storage seam for the prompt library. Every call is scoped to a user id;
//! rows owned by another user behave exactly like missing rows.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::folder::{Folder, FolderQuery, FolderUpdateRequest, FolderWithCount, NewFolder};
use crate::models::profile::UserProfile;
use crate::models::prompt::{NewPrompt, Prompt, PromptPage, PromptQuery, PromptStats, PromptUpdateRequest};
use crate::utils::error::AppResult;

/// Storage operations used by the library service
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    // ── Prompts ────────────────────────────────────────────────────────

    /// Insert a prompt together with its folder links. Nothing is stored
    /// unless every folder exists and belongs to the user.
    async fn create_prompt(&self, user_id: &str, prompt: NewPrompt) -> AppResult<Prompt>;

    async fn get_prompt(&self, user_id: &str, id: Uuid) -> AppResult<Prompt>;

    async fn list_prompts(&self, user_id: &str, query: &PromptQuery) -> AppResult<PromptPage>;

    /// Apply an already validated partial update
    async fn update_prompt(
        &self,
        user_id: &str,
        id: Uuid,
        update: PromptUpdateRequest,
    ) -> AppResult<Prompt>;

    /// Delete a prompt and its folder links
    async fn delete_prompt(&self, user_id: &str, id: Uuid) -> AppResult<()>;

    async fn toggle_favorite(&self, user_id: &str, id: Uuid) -> AppResult<Prompt>;

    /// `usage_count += 1`, `last_used_at = now`
    async fn record_use(&self, user_id: &str, id: Uuid) -> AppResult<Prompt>;

    async fn prompt_stats(&self, user_id: &str) -> AppResult<PromptStats>;

    // ── Folder links ───────────────────────────────────────────────────

    /// Replace every folder link of a prompt
    async fn assign_prompt_to_folders(
        &self,
        user_id: &str,
        prompt_id: Uuid,
        folder_ids: &[Uuid],
    ) -> AppResult<()>;

    async fn prompt_folder_ids(&self, user_id: &str, prompt_id: Uuid) -> AppResult<Vec<Uuid>>;

    /// Adding an existing link is a no-op
    async fn add_prompt_to_folder(&self, user_id: &str, folder_id: Uuid, prompt_id: Uuid)
        -> AppResult<()>;

    async fn remove_prompt_from_folder(
        &self,
        user_id: &str,
        folder_id: Uuid,
        prompt_id: Uuid,
    ) -> AppResult<()>;

    async fn folder_prompts(&self, user_id: &str, folder_id: Uuid) -> AppResult<Vec<Prompt>>;

    // ── Folders ────────────────────────────────────────────────────────

    /// Names are unique per user, case-insensitively
    async fn create_folder(&self, user_id: &str, folder: NewFolder) -> AppResult<Folder>;

    async fn list_folders(&self, user_id: &str, query: &FolderQuery)
        -> AppResult<Vec<FolderWithCount>>;

    async fn get_folder(&self, user_id: &str, id: Uuid) -> AppResult<FolderWithCount>;

    async fn update_folder(
        &self,
        user_id: &str,
        id: Uuid,
        update: FolderUpdateRequest,
    ) -> AppResult<Folder>;

    /// Delete a folder and its links; the prompts survive
    async fn delete_folder(&self, user_id: &str, id: Uuid) -> AppResult<()>;

    // ── Profiles ───────────────────────────────────────────────────────

    async fn get_profile(&self, user_id: &str) -> AppResult<Option<UserProfile>>;

    async fn upsert_profile(&self, profile: UserProfile) -> AppResult<UserProfile>;
}
