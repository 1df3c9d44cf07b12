//! Library Service
//!
//! Business logic for saved prompts, folders and user profiles. Input is
//! validated here; the gateway only stores what it is given.

use std::sync::Arc;

use uuid::Uuid;

use promptbook_core::validation::{
    validate_folder, validate_search_query, validate_title, MAX_TITLE_CHARS,
};
use promptbook_core::{validate_fields, StructuredPromptInput};
use promptbook_llm::{GenerationResult, ProviderKind};

use crate::models::folder::{
    Folder, FolderCreateRequest, FolderQuery, FolderUpdateRequest, FolderWithCount, NewFolder,
};
use crate::models::profile::{ProfileUpdate, UserProfile};
use crate::models::prompt::{
    NewPrompt, Prompt, PromptCreateRequest, PromptPage, PromptQuery, PromptStats,
    PromptUpdateRequest,
};
use crate::services::generation::{GenerateOptions, GenerationService};
use crate::storage::PersistenceGateway;
use crate::utils::error::AppResult;

/// Service for the prompt library
#[derive(Clone)]
pub struct LibraryService {
    gateway: Arc<dyn PersistenceGateway>,
}

impl std::fmt::Debug for LibraryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryService").finish_non_exhaustive()
    }
}

fn dedup(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(id) {
            seen.push(*id);
        }
    }
    seen
}

const COPY_SUFFIX: &str = " (Copy)";

/// `"<title> (Copy)"`, with the base cut so the result stays a valid title
fn copy_title(title: &str) -> String {
    let room = MAX_TITLE_CHARS - COPY_SUFFIX.chars().count();
    let base: String = title.trim().chars().take(room).collect();
    format!("{}{}", base.trim_end(), COPY_SUFFIX)
}

fn normalize_search(search: Option<String>) -> AppResult<Option<String>> {
    match search {
        Some(query) if !query.trim().is_empty() => Ok(Some(validate_search_query(&query)?)),
        _ => Ok(None),
    }
}

impl LibraryService {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }

    // ── Prompts ────────────────────────────────────────────────────────

    /// Validate and store a prompt along with its folder links
    pub async fn create_prompt(&self, user_id: &str, request: PromptCreateRequest) -> AppResult<Prompt> {
        let title = validate_title(request.input.title.as_deref())?;
        validate_fields(&request.input)?;

        let prompt = self
            .gateway
            .create_prompt(
                user_id,
                NewPrompt {
                    title,
                    input: request.input,
                    meta_prompt: request.meta_prompt,
                    is_favorite: request.is_favorite,
                    folder_ids: dedup(&request.folder_ids),
                },
            )
            .await?;

        tracing::info!(user_id, prompt_id = %prompt.id, "Saved prompt");
        Ok(prompt)
    }

    /// Store the result of a generation
    pub async fn save_generated(
        &self,
        user_id: &str,
        input: &StructuredPromptInput,
        result: &GenerationResult,
        folder_ids: &[Uuid],
    ) -> AppResult<Prompt> {
        self.create_prompt(
            user_id,
            PromptCreateRequest {
                input: input.clone(),
                meta_prompt: Some(result.content.clone()),
                is_favorite: false,
                folder_ids: folder_ids.to_vec(),
            },
        )
        .await
    }

    pub async fn list_prompts(&self, user_id: &str, mut query: PromptQuery) -> AppResult<PromptPage> {
        query.search = normalize_search(query.search)?;
        self.gateway.list_prompts(user_id, &query).await
    }

    pub async fn get_prompt(&self, user_id: &str, id: Uuid) -> AppResult<Prompt> {
        self.gateway.get_prompt(user_id, id).await
    }

    /// Partial update; the merged record must still pass validation
    pub async fn update_prompt(
        &self,
        user_id: &str,
        id: Uuid,
        update: PromptUpdateRequest,
    ) -> AppResult<Prompt> {
        let existing = self.gateway.get_prompt(user_id, id).await?;
        let merged = update.merged_input(&existing);
        validate_title(merged.title.as_deref())?;
        validate_fields(&merged)?;

        self.gateway.update_prompt(user_id, id, update).await
    }

    pub async fn delete_prompt(&self, user_id: &str, id: Uuid) -> AppResult<()> {
        self.gateway.delete_prompt(user_id, id).await?;
        tracing::info!(user_id, prompt_id = %id, "Deleted prompt");
        Ok(())
    }

    pub async fn toggle_favorite(&self, user_id: &str, id: Uuid) -> AppResult<Prompt> {
        self.gateway.toggle_favorite(user_id, id).await
    }

    pub async fn record_use(&self, user_id: &str, id: Uuid) -> AppResult<Prompt> {
        self.gateway.record_use(user_id, id).await
    }

    /// Copy a prompt as `"<title> (Copy)"`: not a favorite, unused, no folders
    pub async fn duplicate_prompt(&self, user_id: &str, id: Uuid) -> AppResult<Prompt> {
        let original = self.gateway.get_prompt(user_id, id).await?;
        let mut input = original.input();
        input.title = Some(copy_title(&original.title));

        self.create_prompt(
            user_id,
            PromptCreateRequest {
                input,
                meta_prompt: original.meta_prompt,
                is_favorite: false,
                folder_ids: Vec::new(),
            },
        )
        .await
    }

    pub async fn prompt_stats(&self, user_id: &str) -> AppResult<PromptStats> {
        self.gateway.prompt_stats(user_id).await
    }

    /// Replace the folder assignments of a prompt
    pub async fn assign_folders(
        &self,
        user_id: &str,
        prompt_id: Uuid,
        folder_ids: &[Uuid],
    ) -> AppResult<Vec<Uuid>> {
        let folder_ids = dedup(folder_ids);
        self.gateway
            .assign_prompt_to_folders(user_id, prompt_id, &folder_ids)
            .await?;
        Ok(folder_ids)
    }

    /// Fail with `NotFound` unless every folder belongs to the user
    pub async fn ensure_folders(&self, user_id: &str, folder_ids: &[Uuid]) -> AppResult<()> {
        for folder_id in dedup(folder_ids) {
            self.gateway.get_folder(user_id, folder_id).await?;
        }
        Ok(())
    }

    pub async fn prompt_folder_ids(&self, user_id: &str, prompt_id: Uuid) -> AppResult<Vec<Uuid>> {
        self.gateway.prompt_folder_ids(user_id, prompt_id).await
    }

    /// Recompile a stored prompt, generate again, and store the new meta
    /// prompt. Counts as a use.
    pub async fn regenerate(
        &self,
        user_id: &str,
        id: Uuid,
        generation: &GenerationService,
        provider: Option<ProviderKind>,
        options: GenerateOptions,
    ) -> AppResult<(Prompt, GenerationResult)> {
        let prompt = self.gateway.get_prompt(user_id, id).await?;
        let kind = generation
            .select_provider(provider, || self.preferred_provider(user_id))
            .await?;

        let result = generation
            .generate(&prompt.input(), Some(kind), options)
            .await?;

        self.gateway
            .update_prompt(
                user_id,
                id,
                PromptUpdateRequest {
                    meta_prompt: Some(result.content.clone()),
                    ..Default::default()
                },
            )
            .await?;
        let prompt = self.gateway.record_use(user_id, id).await?;

        tracing::info!(user_id, prompt_id = %id, provider = %kind, "Regenerated prompt");
        Ok((prompt, result))
    }

    // ── Folders ────────────────────────────────────────────────────────

    pub async fn create_folder(&self, user_id: &str, request: FolderCreateRequest) -> AppResult<Folder> {
        let color = validate_folder(
            &request.name,
            request.description.as_deref(),
            request.color.as_deref(),
        )?;

        self.gateway
            .create_folder(
                user_id,
                NewFolder {
                    name: request.name.trim().to_string(),
                    description: request.description,
                    color,
                },
            )
            .await
    }

    pub async fn list_folders(&self, user_id: &str, mut query: FolderQuery) -> AppResult<Vec<FolderWithCount>> {
        query.search = normalize_search(query.search)?;
        self.gateway.list_folders(user_id, &query).await
    }

    pub async fn get_folder(&self, user_id: &str, id: Uuid) -> AppResult<FolderWithCount> {
        self.gateway.get_folder(user_id, id).await
    }

    pub async fn update_folder(
        &self,
        user_id: &str,
        id: Uuid,
        update: FolderUpdateRequest,
    ) -> AppResult<Folder> {
        let existing = self.gateway.get_folder(user_id, id).await?.folder;

        let name = update.name.as_deref().unwrap_or(&existing.name);
        let description = match &update.description {
            Some(d) => Some(d.as_str()),
            None => existing.description.as_deref(),
        };
        let color = update.color.as_deref().unwrap_or(&existing.color);
        let color = validate_folder(name, description, Some(color))?;

        let normalized = FolderUpdateRequest {
            name: update.name.as_deref().map(|n| n.trim().to_string()),
            description: update.description,
            color: Some(color),
        };
        self.gateway.update_folder(user_id, id, normalized).await
    }

    /// Delete a folder; its prompts are kept
    pub async fn delete_folder(&self, user_id: &str, id: Uuid) -> AppResult<()> {
        self.gateway.delete_folder(user_id, id).await
    }

    pub async fn folder_prompts(&self, user_id: &str, folder_id: Uuid) -> AppResult<Vec<Prompt>> {
        self.gateway.folder_prompts(user_id, folder_id).await
    }

    pub async fn add_prompt_to_folder(
        &self,
        user_id: &str,
        folder_id: Uuid,
        prompt_id: Uuid,
    ) -> AppResult<()> {
        self.gateway
            .add_prompt_to_folder(user_id, folder_id, prompt_id)
            .await
    }

    pub async fn remove_prompt_from_folder(
        &self,
        user_id: &str,
        folder_id: Uuid,
        prompt_id: Uuid,
    ) -> AppResult<()> {
        self.gateway
            .remove_prompt_from_folder(user_id, folder_id, prompt_id)
            .await
    }

    // ── Profiles ───────────────────────────────────────────────────────

    /// Stored profile, or a default one if the user never saved settings
    pub async fn get_profile(&self, user_id: &str) -> AppResult<UserProfile> {
        Ok(self
            .gateway
            .get_profile(user_id)
            .await?
            .unwrap_or_else(|| UserProfile::new(user_id)))
    }

    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> AppResult<UserProfile> {
        let mut profile = self.get_profile(user_id).await?;
        profile.apply_update(update);
        self.gateway.upsert_profile(profile).await
    }

    pub async fn preferred_provider(&self, user_id: &str) -> AppResult<Option<ProviderKind>> {
        Ok(self
            .gateway
            .get_profile(user_id)
            .await?
            .and_then(|p| p.preferred_provider))
    }
}
