//! PromptBook Server - Rust Backend Library
//!
//! HTTP backend that turns structured prompt fields into a meta prompt via
//! OpenAI or Gemini, and keeps a per-user prompt library.
//! It includes:
//! - axum handlers and the router
//! - Business logic services (generation orchestrator, prompt library)
//! - Storage layer (config loading, persistence gateway)
//! - Data models and utilities

pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use commands::router;
pub use models::settings::ServerConfig;
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
