//! Raw Provider Handlers
//!
//! Thin routes straight to one provider, plus key status and a connectivity
//! test. The prompt compiler is not involved.

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;

use promptbook_llm::{CompletionRequest, ProviderKind};

use crate::models::generation::{
    CompletionResponse, ConnectionTestRequest, ConnectionTestResponse, GeminiGenerateRequest,
    OpenAiChatRequest, ProviderStatusResponse,
};
use crate::state::AppState;
use crate::utils::{AppError, AppResult, UserId};

use super::generate::sse_response;

/// Parse an optional JSON body; an empty body yields the default
pub(crate) fn optional_json<T>(body: &Bytes) -> AppResult<T>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::validation(format!("Failed to parse the request body as JSON: {}", e)))
}

async fn complete_or_stream(
    state: &AppState,
    kind: ProviderKind,
    request: CompletionRequest,
    stream: bool,
) -> AppResult<Response> {
    if stream {
        let stream = state.generation.stream_raw(kind, request).await?;
        return Ok(sse_response(stream));
    }

    let result = state.generation.complete_raw(kind, request).await?;
    Ok(Json(CompletionResponse {
        content: result.content,
        usage: result.usage,
        model: result.model,
    })
    .into_response())
}

/// `POST /api/llm/openai`
pub async fn openai_chat(
    State(state): State<AppState>,
    _user: UserId,
    payload: Result<Json<OpenAiChatRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(body) = payload?;
    if body.messages.is_empty() {
        return Err(AppError::validation("messages must not be empty"));
    }

    let request = CompletionRequest::new(body.messages)
        .with_model(body.model)
        .with_temperature(body.temperature)
        .with_max_tokens(body.max_tokens);
    complete_or_stream(&state, ProviderKind::OpenAI, request, body.stream).await
}

/// `POST /api/llm/gemini`
pub async fn gemini_generate(
    State(state): State<AppState>,
    _user: UserId,
    payload: Result<Json<GeminiGenerateRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(body) = payload?;
    if body.prompt.trim().is_empty() {
        return Err(AppError::validation("prompt must not be empty"));
    }

    let request = CompletionRequest::from_prompt(body.prompt)
        .with_model(body.model)
        .with_temperature(body.temperature)
        .with_max_tokens(body.max_output_tokens);
    complete_or_stream(&state, ProviderKind::Gemini, request, body.stream).await
}

/// `GET /api/llm/status`
pub async fn provider_status(State(state): State<AppState>) -> Json<ProviderStatusResponse> {
    Json(ProviderStatusResponse {
        openai: state.generation.key_status(ProviderKind::OpenAI),
        gemini: state.generation.key_status(ProviderKind::Gemini),
        default_provider: state.generation.default_provider(),
    })
}

/// `POST /api/llm/test`
pub async fn test_connection(
    State(state): State<AppState>,
    _user: UserId,
    body: Bytes,
) -> AppResult<Json<ConnectionTestResponse>> {
    let request: ConnectionTestRequest = optional_json(&body)?;
    let response = state
        .generation
        .test_connection(request.provider, request.test_message)
        .await?;
    Ok(Json(response))
}
