//! Configuration Loading
//!
//! Builds the [`ServerConfig`] from an optional JSON file and environment
//! overrides. Environment values win over the file.

use std::fs;
use std::path::{Path, PathBuf};

use promptbook_llm::ProviderKind;

use crate::models::settings::ServerConfig;
use crate::utils::error::{AppError, AppResult};

/// Environment variable naming the JSON config file
pub const CONFIG_PATH_ENV: &str = "PROMPTBOOK_CONFIG";

/// Configuration service for server settings
#[derive(Debug, Default)]
pub struct ConfigService {
    config: ServerConfig,
}

impl ConfigService {
    /// Load from `PROMPTBOOK_CONFIG` (if set) and the process environment
    pub fn load() -> AppResult<Self> {
        let lookup = |name: &str| std::env::var(name).ok();
        let config_path = lookup(CONFIG_PATH_ENV)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        Self::load_with(config_path, lookup)
    }

    /// Load from an explicit file and environment lookup
    pub fn load_with<F>(config_path: Option<PathBuf>, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match config_path.as_deref() {
            Some(path) => Self::load_from_file(path)?,
            None => ServerConfig::default(),
        };
        Self::apply_env_overrides(&mut config, lookup)?;
        config.validate().map_err(AppError::config)?;

        Ok(Self { config })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<ServerConfig> {
        let content = fs::read_to_string(path)?;
        let config: ServerConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment variables on top of `config`
    pub fn apply_env_overrides<F>(config: &mut ServerConfig, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(host) = get("PROMPTBOOK_HOST") {
            config.host = host;
        }
        if let Some(port) = get("PROMPTBOOK_PORT") {
            config.port = parse_env("PROMPTBOOK_PORT", &port)?;
        }
        if let Some(provider) = get("PROMPTBOOK_DEFAULT_PROVIDER") {
            config.default_provider = provider.parse::<ProviderKind>().map_err(|_| {
                AppError::config(format!(
                    "PROMPTBOOK_DEFAULT_PROVIDER must be 'openai' or 'gemini', got '{}'",
                    provider
                ))
            })?;
        }

        if let Some(key) = get("OPENAI_API_KEY") {
            config.openai.api_key = Some(key);
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            config.openai.base_url = Some(url);
        }
        if let Some(model) = get("OPENAI_MODEL") {
            config.openai.model = Some(model);
        }
        if let Some(key) = get("GEMINI_API_KEY") {
            config.gemini.api_key = Some(key);
        }
        if let Some(url) = get("GEMINI_BASE_URL") {
            config.gemini.base_url = Some(url);
        }
        if let Some(model) = get("GEMINI_MODEL") {
            config.gemini.model = Some(model);
        }

        if let Some(temperature) = get("PROMPTBOOK_TEMPERATURE") {
            config.temperature = parse_env("PROMPTBOOK_TEMPERATURE", &temperature)?;
        }
        if let Some(max_tokens) = get("PROMPTBOOK_MAX_TOKENS") {
            config.max_tokens = parse_env("PROMPTBOOK_MAX_TOKENS", &max_tokens)?;
        }
        if let Some(timeout) = get("PROMPTBOOK_HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = Some(parse_env("PROMPTBOOK_HTTP_TIMEOUT_SECS", &timeout)?);
        }
        if let Some(proxy) = get("PROMPTBOOK_PROXY_URL") {
            config.proxy_url = Some(proxy);
        }

        Ok(())
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &ServerConfig {
        &self.config
    }

    /// Take the loaded configuration
    pub fn into_config(self) -> ServerConfig {
        self.config
    }

    /// Log a warning for every provider without a key. Requests to such a
    /// provider fail with 503 instead of aborting startup.
    pub fn warn_missing_keys(&self) {
        for kind in self.config.missing_keys() {
            tracing::warn!(
                provider = %kind,
                env = kind.api_key_env(),
                "API key not configured; requests to this provider will fail"
            );
        }
    }
}

fn parse_env<T>(name: &str, value: &str) -> AppResult<T>
where
    T: std::str::FromStr,
{
    value
        .parse::<T>()
        .map_err(|_| AppError::config(format!("Invalid value for {}: '{}'", name, value)))
}
