//! Generation Handlers
//!
//! `POST /api/prompts/generate`, its streaming variant, and the size
//! pre-check.

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use promptbook_core::validation::validate_title;
use promptbook_core::StructuredPromptInput;
use promptbook_llm::ProviderStream;

use crate::models::generation::{GenerateRequest, GenerateResponse, ValidateResponse};
use crate::services::GenerateOptions;
use crate::state::AppState;
use crate::utils::{AppResult, UserId};

/// Generate a meta prompt, optionally saving it to the caller's library
pub async fn generate(
    State(state): State<AppState>,
    user: UserId,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> AppResult<Json<GenerateResponse>> {
    let Json(request) = payload?;
    if request.save {
        validate_title(request.input.title.as_deref())?;
        state
            .library
            .ensure_folders(user.as_str(), &request.folder_ids)
            .await?;
    }

    let provider = state
        .generation
        .select_provider(request.provider, || {
            state.library.preferred_provider(user.as_str())
        })
        .await?;

    let result = state
        .generation
        .generate(
            &request.input,
            Some(provider),
            GenerateOptions::streaming(request.stream),
        )
        .await?;

    let prompt_id = if request.save {
        let prompt = state
            .library
            .save_generated(user.as_str(), &request.input, &result, &request.folder_ids)
            .await?;
        Some(prompt.id)
    } else {
        None
    };

    Ok(Json(GenerateResponse {
        meta_prompt: result.content,
        provider: result.provider,
        usage: result.usage,
        model: result.model,
        prompt_id,
    }))
}

/// Same input as [`generate`], answered with the provider's SSE stream
pub async fn generate_stream(
    State(state): State<AppState>,
    user: UserId,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload?;

    let provider = state
        .generation
        .select_provider(request.provider, || {
            state.library.preferred_provider(user.as_str())
        })
        .await?;

    let stream = state
        .generation
        .stream_compiled(&request.input, Some(provider))
        .await?;
    Ok(sse_response(stream))
}

/// Estimated size and cost of a request. No provider is called.
pub async fn validate(
    State(state): State<AppState>,
    payload: Result<Json<StructuredPromptInput>, JsonRejection>,
) -> AppResult<Json<ValidateResponse>> {
    let Json(input) = payload?;
    Ok(Json(state.generation.validate_estimate(&input)))
}

/// Forward a provider stream to the client byte for byte
pub(crate) fn sse_response(stream: ProviderStream) -> Response {
    tracing::debug!(provider = %stream.provider, model = %stream.model, "Streaming response");
    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Body::from_stream(stream.body),
    )
        .into_response()
}
