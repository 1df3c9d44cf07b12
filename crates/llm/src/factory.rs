//! Provider Factory
//!
//! Builds adapters from configuration and keeps them in a registry keyed by
//! [`ProviderKind`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::gemini::GeminiProvider;
use crate::openai::OpenAIProvider;
use crate::provider::ProviderAdapter;
use crate::types::{LlmError, LlmResult, ProviderConfig, ProviderKind};

/// Create the adapter for `config.provider`.
pub fn create_provider(config: ProviderConfig) -> LlmResult<Arc<dyn ProviderAdapter>> {
    let provider: Arc<dyn ProviderAdapter> = match config.provider {
        ProviderKind::OpenAI => Arc::new(OpenAIProvider::new(config)?),
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(config)?),
    };
    Ok(provider)
}

/// Adapters available to the server, one per provider.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one adapter per config. A later config for the same provider
    /// replaces the earlier one.
    pub fn from_configs(configs: impl IntoIterator<Item = ProviderConfig>) -> LlmResult<Self> {
        let mut registry = Self::new();
        for config in configs {
            registry.register(create_provider(config)?);
        }
        Ok(registry)
    }

    pub fn register(&mut self, provider: Arc<dyn ProviderAdapter>) {
        self.providers.insert(provider.kind(), provider);
    }

    pub fn with(mut self, provider: Arc<dyn ProviderAdapter>) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> LlmResult<Arc<dyn ProviderAdapter>> {
        self.providers
            .get(&kind)
            .cloned()
            .ok_or_else(|| LlmError::UnsupportedProvider {
                name: kind.to_string(),
            })
    }

    /// Registered providers in [`ProviderKind::ALL`] order.
    pub fn kinds(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|k| self.providers.contains_key(k))
            .collect()
    }

    pub fn is_configured(&self, kind: ProviderKind) -> bool {
        self.providers
            .get(&kind)
            .map(|p| p.is_configured())
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.kinds())
            .finish()
    }
}
