//! Server Settings Models
//!
//! Data structures for server configuration.

use serde::{Deserialize, Serialize};

use promptbook_core::SystemPromptVersion;
use promptbook_llm::{mask_secret, ProviderConfig, ProviderKind};

/// Per-provider settings
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Read from the config file or environment, never written back
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &self.api_key.as_deref().map(mask_secret))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Provider used when neither the request nor the user profile names one
    pub default_provider: ProviderKind,
    pub openai: ProviderSettings,
    pub gemini: ProviderSettings,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Outbound request timeout; unset means no timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
    pub system_prompt: SystemPromptVersion,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            default_provider: ProviderKind::OpenAI,
            openai: ProviderSettings::default(),
            gemini: ProviderSettings::default(),
            temperature: 0.7,
            max_tokens: 2000,
            http_timeout_secs: None,
            proxy_url: None,
            system_prompt: SystemPromptVersion::default(),
        }
    }
}

impl ServerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("host must not be empty".to_string());
        }

        if self.port == 0 {
            return Err("port must be between 1 and 65535".to_string());
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "Invalid temperature: {}. Must be between 0 and 2",
                self.temperature
            ));
        }

        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }

        if self.http_timeout_secs == Some(0) {
            return Err("http_timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }

    pub fn provider_settings(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::OpenAI => &self.openai,
            ProviderKind::Gemini => &self.gemini,
        }
    }

    fn provider_settings_mut(&mut self, kind: ProviderKind) -> &mut ProviderSettings {
        match kind {
            ProviderKind::OpenAI => &mut self.openai,
            ProviderKind::Gemini => &mut self.gemini,
        }
    }

    /// Point a provider at a different endpoint (tests, proxies, gateways).
    pub fn with_base_url(mut self, kind: ProviderKind, base_url: impl Into<String>) -> Self {
        self.provider_settings_mut(kind).base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key(mut self, kind: ProviderKind, key: impl Into<String>) -> Self {
        self.provider_settings_mut(kind).api_key = Some(key.into());
        self
    }

    /// Adapter configuration for a provider.
    pub fn provider_config(&self, kind: ProviderKind) -> ProviderConfig {
        let settings = self.provider_settings(kind);
        let mut config = ProviderConfig::for_provider(kind);
        config.api_key = settings.api_key.clone();
        config.base_url = settings.base_url.clone();
        if let Some(model) = settings.model.as_ref().filter(|m| !m.trim().is_empty()) {
            config.model = model.clone();
        }
        config.temperature = self.temperature;
        config.max_tokens = self.max_tokens;
        config.timeout_secs = self.http_timeout_secs;
        config.proxy_url = self.proxy_url.clone();
        config
    }

    /// Providers without an API key.
    pub fn missing_keys(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| {
                self.provider_settings(*kind)
                    .api_key
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default()
                    .is_empty()
            })
            .collect()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
