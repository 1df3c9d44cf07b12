//! Application State
//!
//! Shared state handed to every axum handler. Everything is built once at
//! startup from the configuration; there are no global singletons.

use std::sync::Arc;

use promptbook_llm::{ProviderKind, ProviderRegistry};

use crate::models::settings::ServerConfig;
use crate::services::{GenerationService, LibraryService};
use crate::storage::{InMemoryGateway, PersistenceGateway};
use crate::utils::error::AppResult;

/// Application state shared across requests
#[derive(Debug, Clone)]
pub struct AppState {
    pub generation: Arc<GenerationService>,
    pub library: Arc<LibraryService>,
}

impl AppState {
    /// Build the provider registry from config, backed by in-memory storage
    pub fn from_config(config: ServerConfig) -> AppResult<Self> {
        let registry = ProviderRegistry::from_configs(
            ProviderKind::ALL
                .into_iter()
                .map(|kind| config.provider_config(kind)),
        )?;
        Ok(Self::new(&config, registry, Arc::new(InMemoryGateway::new())))
    }

    /// Assemble state from explicit parts
    pub fn new(
        config: &ServerConfig,
        registry: ProviderRegistry,
        gateway: Arc<dyn PersistenceGateway>,
    ) -> Self {
        let generation = GenerationService::new(registry, config.default_provider)
            .with_system_prompt(config.system_prompt);

        Self {
            generation: Arc::new(generation),
            library: Arc::new(LibraryService::new(gateway)),
        }
    }

    /// Whether a provider has an API key
    pub fn is_provider_configured(&self, kind: ProviderKind) -> bool {
        self.generation.registry().is_configured(kind)
    }
}
