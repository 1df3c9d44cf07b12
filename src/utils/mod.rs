//! Utility Functions
//!
//! Error types and request extractors shared by every handler.

pub mod auth;
pub mod error;

pub use auth::UserId;
pub use error::{AppError, AppResult};
