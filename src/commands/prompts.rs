//! Prompt Library Handlers
//!
//! CRUD and actions on the caller's saved prompts.

use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::models::generation::{GenerateResponse, RegenerateRequest};
use crate::models::prompt::{
    FolderAssignmentRequest, Prompt, PromptCreateRequest, PromptPage, PromptQuery, PromptStats,
    PromptUpdateRequest,
};
use crate::services::GenerateOptions;
use crate::state::AppState;
use crate::utils::{AppResult, UserId};

use super::llm::optional_json;

/// `GET /api/prompts`
pub async fn list_prompts(
    State(state): State<AppState>,
    user: UserId,
    query: Result<Query<PromptQuery>, QueryRejection>,
) -> AppResult<Json<PromptPage>> {
    let Query(query) = query?;
    Ok(Json(state.library.list_prompts(user.as_str(), query).await?))
}

/// `POST /api/prompts`
pub async fn create_prompt(
    State(state): State<AppState>,
    user: UserId,
    payload: Result<Json<PromptCreateRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Prompt>)> {
    let Json(request) = payload?;
    let prompt = state.library.create_prompt(user.as_str(), request).await?;
    Ok((StatusCode::CREATED, Json(prompt)))
}

/// `GET /api/prompts/stats`
pub async fn prompt_stats(
    State(state): State<AppState>,
    user: UserId,
) -> AppResult<Json<PromptStats>> {
    Ok(Json(state.library.prompt_stats(user.as_str()).await?))
}

/// `GET /api/prompts/{id}`
pub async fn get_prompt(
    State(state): State<AppState>,
    user: UserId,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Prompt>> {
    let Path(id) = id?;
    Ok(Json(state.library.get_prompt(user.as_str(), id).await?))
}

/// `PATCH /api/prompts/{id}`
pub async fn update_prompt(
    State(state): State<AppState>,
    user: UserId,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<PromptUpdateRequest>, JsonRejection>,
) -> AppResult<Json<Prompt>> {
    let Path(id) = id?;
    let Json(update) = payload?;
    Ok(Json(state.library.update_prompt(user.as_str(), id, update).await?))
}

/// `DELETE /api/prompts/{id}`
pub async fn delete_prompt(
    State(state): State<AppState>,
    user: UserId,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    state.library.delete_prompt(user.as_str(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/prompts/{id}/favorite`
pub async fn toggle_favorite(
    State(state): State<AppState>,
    user: UserId,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Prompt>> {
    let Path(id) = id?;
    Ok(Json(state.library.toggle_favorite(user.as_str(), id).await?))
}

/// `POST /api/prompts/{id}/use`
pub async fn record_use(
    State(state): State<AppState>,
    user: UserId,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Prompt>> {
    let Path(id) = id?;
    Ok(Json(state.library.record_use(user.as_str(), id).await?))
}

/// `POST /api/prompts/{id}/duplicate`
pub async fn duplicate_prompt(
    State(state): State<AppState>,
    user: UserId,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<(StatusCode, Json<Prompt>)> {
    let Path(id) = id?;
    let copy = state.library.duplicate_prompt(user.as_str(), id).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// `POST /api/prompts/{id}/regenerate`. The body is optional.
pub async fn regenerate_prompt(
    State(state): State<AppState>,
    user: UserId,
    id: Result<Path<Uuid>, PathRejection>,
    body: Bytes,
) -> AppResult<Json<GenerateResponse>> {
    let Path(id) = id?;
    let request: RegenerateRequest = optional_json(&body)?;

    let (prompt, result) = state
        .library
        .regenerate(
            user.as_str(),
            id,
            &state.generation,
            request.provider,
            GenerateOptions::streaming(request.stream),
        )
        .await?;

    Ok(Json(GenerateResponse {
        meta_prompt: result.content,
        provider: result.provider,
        usage: result.usage,
        model: result.model,
        prompt_id: Some(prompt.id),
    }))
}

/// `GET /api/prompts/{id}/folders`
pub async fn prompt_folders(
    State(state): State<AppState>,
    user: UserId,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<FolderAssignmentRequest>> {
    let Path(id) = id?;
    let folder_ids = state.library.prompt_folder_ids(user.as_str(), id).await?;
    Ok(Json(FolderAssignmentRequest { folder_ids }))
}

/// `PUT /api/prompts/{id}/folders`
pub async fn assign_folders(
    State(state): State<AppState>,
    user: UserId,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<FolderAssignmentRequest>, JsonRejection>,
) -> AppResult<Json<FolderAssignmentRequest>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let folder_ids = state
        .library
        .assign_folders(user.as_str(), id, &request.folder_ids)
        .await?;
    Ok(Json(FolderAssignmentRequest { folder_ids }))
}
