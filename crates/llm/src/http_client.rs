//! HTTP Client Factory
//!
//! Provides a factory function for building reqwest clients with proxy and
//! timeout support.

use std::time::Duration;

use crate::types::{LlmError, LlmResult, ProviderConfig};

/// Options applied to every client the adapters build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpClientOptions {
    pub timeout: Option<Duration>,
    pub proxy_url: Option<String>,
}

impl From<&ProviderConfig> for HttpClientOptions {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            timeout: config.timeout_secs.map(Duration::from_secs),
            proxy_url: config.proxy_url.clone(),
        }
    }
}

/// Build a `reqwest::Client` with the resolved proxy configuration.
///
/// - `Some(proxy)` -> configure proxy on the client
/// - `None` -> explicitly disable proxy (`no_proxy`), ignoring env vars
pub fn build_http_client(options: &HttpClientOptions) -> LlmResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    match options.proxy_url.as_deref().filter(|u| !u.trim().is_empty()) {
        Some(url) => {
            let proxy = reqwest::Proxy::all(url).map_err(|e| LlmError::InvalidRequest {
                message: format!("Invalid proxy URL: {}", e),
            })?;
            builder = builder.proxy(proxy);
        }
        None => {
            builder = builder.no_proxy();
        }
    }
    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|e| LlmError::NetworkError {
        message: format!("Failed to build HTTP client: {}", e),
    })
}
