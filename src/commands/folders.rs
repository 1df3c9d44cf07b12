//! Folder Handlers

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::models::folder::{
    Folder, FolderCreateRequest, FolderQuery, FolderUpdateRequest, FolderWithCount,
};
use crate::models::prompt::Prompt;
use crate::state::AppState;
use crate::utils::{AppResult, UserId};

/// `GET /api/folders`
pub async fn list_folders(
    State(state): State<AppState>,
    user: UserId,
    query: Result<Query<FolderQuery>, QueryRejection>,
) -> AppResult<Json<Vec<FolderWithCount>>> {
    let Query(query) = query?;
    Ok(Json(state.library.list_folders(user.as_str(), query).await?))
}

/// `POST /api/folders`
pub async fn create_folder(
    State(state): State<AppState>,
    user: UserId,
    payload: Result<Json<FolderCreateRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Folder>)> {
    let Json(request) = payload?;
    let folder = state.library.create_folder(user.as_str(), request).await?;
    Ok((StatusCode::CREATED, Json(folder)))
}

/// `GET /api/folders/{id}`
pub async fn get_folder(
    State(state): State<AppState>,
    user: UserId,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<FolderWithCount>> {
    let Path(id) = id?;
    Ok(Json(state.library.get_folder(user.as_str(), id).await?))
}

/// `PATCH /api/folders/{id}`
pub async fn update_folder(
    State(state): State<AppState>,
    user: UserId,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<FolderUpdateRequest>, JsonRejection>,
) -> AppResult<Json<Folder>> {
    let Path(id) = id?;
    let Json(update) = payload?;
    Ok(Json(state.library.update_folder(user.as_str(), id, update).await?))
}

/// `DELETE /api/folders/{id}`
pub async fn delete_folder(
    State(state): State<AppState>,
    user: UserId,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    state.library.delete_folder(user.as_str(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/folders/{id}/prompts`
pub async fn folder_prompts(
    State(state): State<AppState>,
    user: UserId,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Vec<Prompt>>> {
    let Path(id) = id?;
    Ok(Json(state.library.folder_prompts(user.as_str(), id).await?))
}

/// `POST /api/folders/{id}/prompts/{prompt_id}`
pub async fn add_prompt(
    State(state): State<AppState>,
    user: UserId,
    ids: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path((folder_id, prompt_id)) = ids?;
    state
        .library
        .add_prompt_to_folder(user.as_str(), folder_id, prompt_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/folders/{id}/prompts/{prompt_id}`
pub async fn remove_prompt(
    State(state): State<AppState>,
    user: UserId,
    ids: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path((folder_id, prompt_id)) = ids?;
    state
        .library
        .remove_prompt_from_folder(user.as_str(), folder_id, prompt_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
