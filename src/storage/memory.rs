//! In-Memory Gateway
//!
//! [`PersistenceGateway`] backed by plain collections behind a
//! `tokio::sync::RwLock`. Used by the server binary and by tests.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::folder::{
    Folder, FolderOrderBy, FolderQuery, FolderUpdateRequest, FolderWithCount, NewFolder,
};
use crate::models::profile::UserProfile;
use crate::models::prompt::{
    NewPrompt, Prompt, PromptOrderBy, PromptPage, PromptQuery, PromptStats, PromptUpdateRequest,
    SortDirection,
};
use crate::utils::error::{AppError, AppResult};

use super::gateway::PersistenceGateway;

#[derive(Debug, Default)]
struct Store {
    prompts: Vec<Prompt>,
    folders: Vec<Folder>,
    /// (folder_id, prompt_id)
    links: BTreeSet<(Uuid, Uuid)>,
    profiles: HashMap<String, UserProfile>,
}

impl Store {
    fn prompt(&self, user_id: &str, id: Uuid) -> AppResult<&Prompt> {
        self.prompts
            .iter()
            .find(|p| p.id == id && p.user_id == user_id)
            .ok_or_else(|| AppError::not_found(format!("prompt {}", id)))
    }

    fn prompt_mut(&mut self, user_id: &str, id: Uuid) -> AppResult<&mut Prompt> {
        self.prompts
            .iter_mut()
            .find(|p| p.id == id && p.user_id == user_id)
            .ok_or_else(|| AppError::not_found(format!("prompt {}", id)))
    }

    fn folder(&self, user_id: &str, id: Uuid) -> AppResult<&Folder> {
        self.folders
            .iter()
            .find(|f| f.id == id && f.user_id == user_id)
            .ok_or_else(|| AppError::not_found(format!("folder {}", id)))
    }

    fn folder_mut(&mut self, user_id: &str, id: Uuid) -> AppResult<&mut Folder> {
        self.folders
            .iter_mut()
            .find(|f| f.id == id && f.user_id == user_id)
            .ok_or_else(|| AppError::not_found(format!("folder {}", id)))
    }

    fn ensure_unique_folder_name(&self, user_id: &str, name: &str, except: Option<Uuid>) -> AppResult<()> {
        let lower = name.to_lowercase();
        let clash = self.folders.iter().any(|f| {
            f.user_id == user_id && Some(f.id) != except && f.name.to_lowercase() == lower
        });
        if clash {
            return Err(AppError::conflict(format!(
                "A folder named '{}' already exists",
                name
            )));
        }
        Ok(())
    }

    fn prompt_count(&self, folder_id: Uuid) -> usize {
        self.links.iter().filter(|(f, _)| *f == folder_id).count()
    }

    fn with_count(&self, folder: &Folder) -> FolderWithCount {
        FolderWithCount {
            folder: folder.clone(),
            prompt_count: self.prompt_count(folder.id),
        }
    }
}

/// In-memory storage
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    store: RwLock<Store>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn direction(ordering: Ordering, order: SortDirection) -> Ordering {
    match order {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn paginate<T>(items: Vec<T>, offset: Option<usize>, limit: Option<usize>) -> Vec<T> {
    let iter = items.into_iter().skip(offset.unwrap_or(0));
    match limit {
        Some(limit) => iter.take(limit).collect(),
        None => iter.collect(),
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    async fn create_prompt(&self, user_id: &str, prompt: NewPrompt) -> AppResult<Prompt> {
        let now = Utc::now();
        let input = prompt.input;
        let record = Prompt {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: prompt.title,
            role: input.role,
            personality: optional_text(input.personality),
            instruction: input.instruction,
            context: optional_text(input.context),
            example: optional_text(input.example),
            meta_prompt: optional_text(prompt.meta_prompt),
            is_favorite: prompt.is_favorite,
            usage_count: 0,
            last_used_at: None,
            created_at: now,
            updated_at: now,
        };

        let mut store = self.store.write().await;
        for folder_id in &prompt.folder_ids {
            store.folder(user_id, *folder_id)?;
        }
        store.prompts.push(record.clone());
        for folder_id in prompt.folder_ids {
            store.links.insert((folder_id, record.id));
        }
        tracing::debug!(user_id, prompt_id = %record.id, "Prompt created");
        Ok(record)
    }

    async fn get_prompt(&self, user_id: &str, id: Uuid) -> AppResult<Prompt> {
        let store = self.store.read().await;
        store.prompt(user_id, id).cloned()
    }

    async fn list_prompts(&self, user_id: &str, query: &PromptQuery) -> AppResult<PromptPage> {
        let store = self.store.read().await;
        let needle = query.search.as_deref().map(str::to_lowercase);

        let mut prompts: Vec<Prompt> = store
            .prompts
            .iter()
            .filter(|p| p.user_id == user_id)
            .filter(|p| query.favorite.is_none_or(|fav| p.is_favorite == fav))
            .filter(|p| {
                query
                    .folder_id
                    .is_none_or(|folder_id| store.links.contains(&(folder_id, p.id)))
            })
            .filter(|p| needle.as_deref().is_none_or(|n| p.matches_search(n)))
            .cloned()
            .collect();

        let order_by = query.order_by.unwrap_or_default();
        let order = query.order.unwrap_or(match order_by {
            PromptOrderBy::Title => SortDirection::Asc,
            _ => SortDirection::Desc,
        });
        prompts.sort_by(|a, b| {
            let ordering = match order_by {
                PromptOrderBy::CreatedAt => a.created_at.cmp(&b.created_at),
                PromptOrderBy::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                PromptOrderBy::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
                PromptOrderBy::UsageCount => a.usage_count.cmp(&b.usage_count),
            };
            direction(ordering, order)
        });

        let total = prompts.len();
        Ok(PromptPage {
            prompts: paginate(prompts, query.offset, query.limit),
            total,
        })
    }

    async fn update_prompt(
        &self,
        user_id: &str,
        id: Uuid,
        update: PromptUpdateRequest,
    ) -> AppResult<Prompt> {
        let mut store = self.store.write().await;
        let prompt = store.prompt_mut(user_id, id)?;

        if let Some(title) = update.title {
            prompt.title = title.trim().to_string();
        }
        if let Some(role) = update.role {
            prompt.role = role;
        }
        if let Some(instruction) = update.instruction {
            prompt.instruction = instruction;
        }
        if let Some(personality) = update.personality {
            prompt.personality = optional_text(Some(personality));
        }
        if let Some(context) = update.context {
            prompt.context = optional_text(Some(context));
        }
        if let Some(example) = update.example {
            prompt.example = optional_text(Some(example));
        }
        if let Some(meta_prompt) = update.meta_prompt {
            prompt.meta_prompt = optional_text(Some(meta_prompt));
        }
        if let Some(is_favorite) = update.is_favorite {
            prompt.is_favorite = is_favorite;
        }
        prompt.updated_at = Utc::now();

        Ok(prompt.clone())
    }

    async fn delete_prompt(&self, user_id: &str, id: Uuid) -> AppResult<()> {
        let mut store = self.store.write().await;
        store.prompt(user_id, id)?;
        store.prompts.retain(|p| p.id != id);
        store.links.retain(|(_, prompt_id)| *prompt_id != id);
        tracing::debug!(user_id, prompt_id = %id, "Prompt deleted");
        Ok(())
    }

    async fn toggle_favorite(&self, user_id: &str, id: Uuid) -> AppResult<Prompt> {
        let mut store = self.store.write().await;
        let prompt = store.prompt_mut(user_id, id)?;
        prompt.is_favorite = !prompt.is_favorite;
        prompt.updated_at = Utc::now();
        Ok(prompt.clone())
    }

    async fn record_use(&self, user_id: &str, id: Uuid) -> AppResult<Prompt> {
        let mut store = self.store.write().await;
        let prompt = store.prompt_mut(user_id, id)?;
        prompt.usage_count = prompt.usage_count.saturating_add(1);
        prompt.last_used_at = Some(Utc::now());
        Ok(prompt.clone())
    }

    async fn prompt_stats(&self, user_id: &str) -> AppResult<PromptStats> {
        let store = self.store.read().await;
        let owned: Vec<&Prompt> = store.prompts.iter().filter(|p| p.user_id == user_id).collect();

        // first prompt wins a tie
        let most_used = owned
            .iter()
            .copied()
            .filter(|p| p.usage_count > 0)
            .fold(None::<&Prompt>, |best, p| match best {
                Some(b) if b.usage_count >= p.usage_count => Some(b),
                _ => Some(p),
            })
            .cloned();

        Ok(PromptStats {
            total_prompts: owned.len(),
            favorite_prompts: owned.iter().filter(|p| p.is_favorite).count(),
            total_folders: store.folders.iter().filter(|f| f.user_id == user_id).count(),
            most_used_prompt: most_used,
        })
    }

    async fn assign_prompt_to_folders(
        &self,
        user_id: &str,
        prompt_id: Uuid,
        folder_ids: &[Uuid],
    ) -> AppResult<()> {
        let mut store = self.store.write().await;
        store.prompt(user_id, prompt_id)?;
        for folder_id in folder_ids {
            store.folder(user_id, *folder_id)?;
        }

        store.links.retain(|(_, p)| *p != prompt_id);
        for folder_id in folder_ids {
            store.links.insert((*folder_id, prompt_id));
        }
        Ok(())
    }

    async fn prompt_folder_ids(&self, user_id: &str, prompt_id: Uuid) -> AppResult<Vec<Uuid>> {
        let store = self.store.read().await;
        store.prompt(user_id, prompt_id)?;
        Ok(store
            .links
            .iter()
            .filter(|(_, p)| *p == prompt_id)
            .map(|(f, _)| *f)
            .collect())
    }

    async fn add_prompt_to_folder(
        &self,
        user_id: &str,
        folder_id: Uuid,
        prompt_id: Uuid,
    ) -> AppResult<()> {
        let mut store = self.store.write().await;
        store.folder(user_id, folder_id)?;
        store.prompt(user_id, prompt_id)?;
        store.links.insert((folder_id, prompt_id));
        Ok(())
    }

    async fn remove_prompt_from_folder(
        &self,
        user_id: &str,
        folder_id: Uuid,
        prompt_id: Uuid,
    ) -> AppResult<()> {
        let mut store = self.store.write().await;
        store.folder(user_id, folder_id)?;
        store.prompt(user_id, prompt_id)?;
        if !store.links.remove(&(folder_id, prompt_id)) {
            return Err(AppError::not_found(format!(
                "prompt {} in folder {}",
                prompt_id, folder_id
            )));
        }
        Ok(())
    }

    async fn folder_prompts(&self, user_id: &str, folder_id: Uuid) -> AppResult<Vec<Prompt>> {
        let store = self.store.read().await;
        store.folder(user_id, folder_id)?;
        let mut prompts: Vec<Prompt> = store
            .prompts
            .iter()
            .filter(|p| p.user_id == user_id && store.links.contains(&(folder_id, p.id)))
            .cloned()
            .collect();
        prompts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(prompts)
    }

    async fn create_folder(&self, user_id: &str, folder: NewFolder) -> AppResult<Folder> {
        let mut store = self.store.write().await;
        store.ensure_unique_folder_name(user_id, &folder.name, None)?;

        let now = Utc::now();
        let record = Folder {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            name: folder.name,
            description: optional_text(folder.description),
            color: folder.color,
            created_at: now,
            updated_at: now,
        };
        store.folders.push(record.clone());
        tracing::debug!(user_id, folder_id = %record.id, "Folder created");
        Ok(record)
    }

    async fn list_folders(
        &self,
        user_id: &str,
        query: &FolderQuery,
    ) -> AppResult<Vec<FolderWithCount>> {
        let store = self.store.read().await;
        let needle = query.search.as_deref().map(str::to_lowercase);

        let mut folders: Vec<&Folder> = store
            .folders
            .iter()
            .filter(|f| f.user_id == user_id)
            .filter(|f| {
                needle
                    .as_deref()
                    .is_none_or(|n| f.name.to_lowercase().contains(n))
            })
            .collect();

        let order_by = query.order_by.unwrap_or_default();
        let order = query.order.unwrap_or(SortDirection::Asc);
        folders.sort_by(|a, b| {
            let ordering = match order_by {
                FolderOrderBy::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                FolderOrderBy::CreatedAt => a.created_at.cmp(&b.created_at),
                FolderOrderBy::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            };
            direction(ordering, order)
        });

        let folders = folders.into_iter().map(|f| store.with_count(f)).collect();
        Ok(paginate(folders, query.offset, query.limit))
    }

    async fn get_folder(&self, user_id: &str, id: Uuid) -> AppResult<FolderWithCount> {
        let store = self.store.read().await;
        let folder = store.folder(user_id, id)?;
        Ok(store.with_count(folder))
    }

    async fn update_folder(
        &self,
        user_id: &str,
        id: Uuid,
        update: FolderUpdateRequest,
    ) -> AppResult<Folder> {
        let mut store = self.store.write().await;
        store.folder(user_id, id)?;
        if let Some(name) = &update.name {
            store.ensure_unique_folder_name(user_id, name, Some(id))?;
        }

        let folder = store.folder_mut(user_id, id)?;
        if let Some(name) = update.name {
            folder.name = name;
        }
        if let Some(description) = update.description {
            folder.description = optional_text(Some(description));
        }
        if let Some(color) = update.color {
            folder.color = color;
        }
        folder.updated_at = Utc::now();
        Ok(folder.clone())
    }

    async fn delete_folder(&self, user_id: &str, id: Uuid) -> AppResult<()> {
        let mut store = self.store.write().await;
        store.folder(user_id, id)?;
        store.folders.retain(|f| f.id != id);
        store.links.retain(|(folder_id, _)| *folder_id != id);
        tracing::debug!(user_id, folder_id = %id, "Folder deleted");
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> AppResult<Option<UserProfile>> {
        let store = self.store.read().await;
        Ok(store.profiles.get(user_id).cloned())
    }

    async fn upsert_profile(&self, profile: UserProfile) -> AppResult<UserProfile> {
        let mut store = self.store.write().await;
        store.profiles.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }
}
