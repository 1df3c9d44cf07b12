//! Response Types
//!
//! Shared response bodies.

use serde::{Deserialize, Serialize};

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Which providers have a key configured
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderHealth {
    pub openai: bool,
    pub gemini: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
    pub providers: ProviderHealth,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            service: "promptbook-server".to_string(),
            providers: ProviderHealth::default(),
        }
    }
}
