//! Error Handling
//!
//! Unified error types for the application.
//! Uses thiserror for ergonomic error definitions and renders every error as
//! a `{ error, code, details? }` JSON body with the matching HTTP status.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use promptbook_core::ValidationError;
use promptbook_llm::LlmError;

use crate::models::response::ErrorBody;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Field, size, or request-shape validation failures
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Provider call failures
    #[error("{0}")]
    Llm(#[from] LlmError),

    /// No caller identity on a protected route
    #[error("Authentication required")]
    Unauthorized,

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violations
    #[error("{0}")]
    Conflict(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a malformed-request validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(ValidationError::malformed(msg))
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Llm(err) => llm_status(err),
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Config(_)
            | AppError::Io(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::Llm(err) => llm_code(err),
            AppError::Unauthorized => "unauthenticated",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Config(_) => "config_error",
            AppError::Io(_) | AppError::Serialization(_) | AppError::Internal(_) => {
                "internal_error"
            }
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Validation(ValidationError::Fields { issues }) => {
                Some(serde_json::json!({ "issues": issues }))
            }
            AppError::Validation(ValidationError::TooLarge {
                estimated_tokens,
                max_tokens,
            }) => Some(serde_json::json!({
                "estimatedTokens": estimated_tokens,
                "maxTokens": max_tokens,
            })),
            AppError::Llm(LlmError::Upstream { status, .. }) => {
                Some(serde_json::json!({ "upstreamStatus": status }))
            }
            _ => None,
        }
    }

    /// Message shown to the client. Server-side failures are not echoed.
    fn public_message(&self) -> String {
        match self {
            AppError::Config(_)
            | AppError::Io(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

fn llm_status(err: &LlmError) -> StatusCode {
    match err {
        LlmError::MissingApiKey { .. } | LlmError::UnsupportedProvider { .. } => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        LlmError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
        LlmError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        LlmError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        LlmError::ContentBlocked { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        LlmError::NoContent { .. } => StatusCode::BAD_GATEWAY,
        LlmError::Upstream { status, .. } => StatusCode::from_u16(*status)
            .ok()
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::BAD_GATEWAY),
        LlmError::NetworkError { .. } | LlmError::ParseError { .. } => StatusCode::BAD_GATEWAY,
        LlmError::Cancelled => StatusCode::REQUEST_TIMEOUT,
    }
}

fn llm_code(err: &LlmError) -> &'static str {
    match err {
        LlmError::MissingApiKey { .. } | LlmError::UnsupportedProvider { .. } => {
            "provider_not_configured"
        }
        LlmError::AuthenticationFailed { .. } => "provider_auth_failed",
        LlmError::RateLimited { .. } => "rate_limited",
        LlmError::InvalidRequest { .. } => "provider_bad_request",
        LlmError::ContentBlocked { .. } => "content_blocked",
        LlmError::NoContent { .. } => "no_content",
        LlmError::Upstream { .. } => "upstream_error",
        LlmError::NetworkError { .. } => "upstream_unreachable",
        LlmError::ParseError { .. } => "upstream_parse_error",
        LlmError::Cancelled => "cancelled",
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "Request rejected");
        }

        let body = ErrorBody {
            error: self.public_message(),
            code: self.code().to_string(),
            details: self.details(),
        };
        (status, Json(body)).into_response()
    }
}
