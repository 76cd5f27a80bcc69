// handlers/protected/profile.rs - Agent profiles and NID/passport scans

use axum::{
    extract::{Multipart, Path, State},
    Extension,
};
use serde_json::{json, Value};

use crate::database::models::{NewProfile, ProfilePatch, UserProfile};
use crate::database::StoreError;
use crate::error::ApiError;
use crate::handlers::{JsonBody, UploadForm};
use crate::media::MediaKind;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::routes::AppState;

async fn load_profile(state: &AppState, user_id: i32) -> Result<UserProfile, ApiError> {
    state
        .store
        .get_profile(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))
}

/// GET /users/:id/profile - Any signed-in user may read a profile
pub async fn get(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<UserProfile> {
    Ok(ApiResponse::success(load_profile(&state, user_id).await?))
}

/// POST /users/:id/profile - Create the profile of oneself (or anyone, as admin)
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<i32>,
    JsonBody(payload): JsonBody<NewProfile>,
) -> ApiResult<UserProfile> {
    user.require_owner_or_admin(user_id)?;
    if state.store.get_user(user_id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let profile = state
        .store
        .create_profile(user_id, payload)
        .await
        .map_err(|err| match err {
            StoreError::Conflict(_) => ApiError::bad_request("Profile already exists"),
            other => other.into(),
        })?;
    Ok(ApiResponse::created(profile))
}

/// PATCH /users/:id/profile - Partial update; an empty body is refused
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<i32>,
    JsonBody(patch): JsonBody<ProfilePatch>,
) -> ApiResult<UserProfile> {
    user.require_owner_or_admin(user_id)?;
    if patch.is_empty() {
        return Err(ApiError::bad_request("No valid fields to update"));
    }
    let profile = state.store.update_profile(user_id, &patch).await?;
    Ok(ApiResponse::success(profile))
}

/// DELETE /users/:id/profile - Admin only
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<i32>,
) -> ApiResult<Value> {
    user.require_admin()?;
    let profile = load_profile(&state, user_id).await?;

    state.store.delete_profile(user_id).await?;
    if let Some(path) = profile.nid_passport_file {
        if let Err(e) = state.media.remove(&path).await {
            tracing::warn!("Could not remove profile file {}: {}", path, e);
        }
    }
    Ok(ApiResponse::success(json!({ "detail": "Profile deleted" })))
}

/// POST /users/:id/profile/upload-file - Attach the NID or passport scan
pub async fn file_upload(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<UserProfile> {
    user.require_owner_or_admin(user_id)?;
    let current = load_profile(&state, user_id).await?;

    let file = UploadForm::read(multipart)
        .await?
        .single_file("nid_passport_file")?;
    let path = state
        .media
        .save(MediaKind::ProfileFile, "nid_passport", &file)
        .await?;
    let profile = state.store.set_profile_file(user_id, Some(&path)).await?;

    if let Some(previous) = current.nid_passport_file {
        if let Err(e) = state.media.remove(&previous).await {
            tracing::warn!("Could not remove replaced profile file {}: {}", previous, e);
        }
    }
    Ok(ApiResponse::success(profile))
}

/// DELETE /users/:id/profile/upload-file - Clear the NID or passport scan
pub async fn file_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<i32>,
) -> ApiResult<UserProfile> {
    user.require_owner_or_admin(user_id)?;
    let current = load_profile(&state, user_id).await?;

    let profile = state.store.set_profile_file(user_id, None).await?;
    if let Some(path) = current.nid_passport_file {
        state.media.remove(&path).await?;
    }
    Ok(ApiResponse::success(profile))
}
