//! Profile Handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::models::profile::{ProfileUpdate, UserProfile};
use crate::state::AppState;
use crate::utils::{AppResult, UserId};

/// `GET /api/profile`
pub async fn get_profile(
    State(state): State<AppState>,
    user: UserId,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(state.library.get_profile(user.as_str()).await?))
}

/// `PUT /api/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    user: UserId,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> AppResult<Json<UserProfile>> {
    let Json(update) = payload?;
    Ok(Json(state.library.update_profile(user.as_str(), update).await?))
}
