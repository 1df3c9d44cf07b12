// PromptBook Server - HTTP Entry Point

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use promptbook_server::storage::ConfigService;
use promptbook_server::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,promptbook=debug")),
        )
        .init();

    let config_service = ConfigService::load().context("Failed to load configuration")?;
    config_service.warn_missing_keys();
    let config = config_service.into_config();
    let bind_addr = config.bind_addr();

    let state = AppState::from_config(config).context("Failed to initialize providers")?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!(addr = %bind_addr, version = env!("CARGO_PKG_VERSION"), "PromptBook server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
