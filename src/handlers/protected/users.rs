// handlers/protected/users.rs - Current user, admin accounts and agent approval

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{self, Registration};
use crate::database::models::User;
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct AgentUpdate {
    #[serde(default)]
    pub is_verified: bool,
}

fn refuse_self_delete(user: &AuthUser, id: i32) -> Result<(), ApiError> {
    if user.id == id {
        Err(ApiError::bad_request("Cannot delete yourself"))
    } else {
        Ok(())
    }
}

/// Fetch a user that must be an agent (non-admin)
async fn load_agent(state: &AppState, id: i32) -> Result<User, ApiError> {
    match state.store.get_user(id).await? {
        Some(user) if !user.is_admin => Ok(user),
        _ => Err(ApiError::not_found("Agent not found")),
    }
}

/// GET /users/me - The account behind the bearer token
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<User> {
    state
        .store
        .get_user(user.id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// POST /users/admin/register - Create another admin account
pub async fn admin_register(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(payload): JsonBody<Registration>,
) -> ApiResult<User> {
    user.require_admin()?;
    let admin = auth::register(state.store.as_ref(), payload, true, state.bcrypt_cost).await?;
    tracing::info!(created_by = user.id, "Admin {} created", admin.username);
    Ok(ApiResponse::created(admin))
}

/// DELETE /users/admin/:id - Remove another admin
pub async fn admin_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<Value> {
    user.require_admin()?;
    refuse_self_delete(&user, id)?;

    match state.store.get_user(id).await? {
        Some(target) if target.is_admin => {}
        _ => return Err(ApiError::not_found("Admin not found")),
    }
    state.store.delete_user(id).await?;
    tracing::info!(user_id = id, deleted_by = user.id, "Admin deleted");
    Ok(ApiResponse::success(json!({ "detail": "Admin deleted." })))
}

/// DELETE /users/:id - Remove any account except one's own
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<Value> {
    user.require_admin()?;
    refuse_self_delete(&user, id)?;

    state.store.delete_user(id).await?;
    tracing::info!(user_id = id, deleted_by = user.id, "User deleted");
    Ok(ApiResponse::success(json!({ "detail": "User has been deleted." })))
}

/// GET /users/agents - All agent accounts
pub async fn agent_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<User>> {
    user.require_admin()?;
    let agents = state.store.list_users(Some(false)).await?;
    Ok(ApiResponse::success(agents))
}

/// GET /users/agents/:id
pub async fn agent_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<User> {
    user.require_admin()?;
    Ok(ApiResponse::success(load_agent(&state, id).await?))
}

/// PATCH /users/agents/:id - Approve or suspend an agent
pub async fn agent_patch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    JsonBody(update): JsonBody<AgentUpdate>,
) -> ApiResult<User> {
    user.require_admin()?;
    load_agent(&state, id).await?;

    let agent = state.store.set_user_verified(id, update.is_verified).await?;
    tracing::info!(agent_id = id, verified = agent.is_verified, "Agent verification changed");
    Ok(ApiResponse::success(agent))
}

/// DELETE /users/agents/:id - Remove an agent; their applications stay, unassigned
pub async fn agent_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<Value> {
    user.require_admin()?;
    load_agent(&state, id).await?;

    state.store.delete_user(id).await?;
    tracing::info!(agent_id = id, deleted_by = user.id, "Agent deleted");
    Ok(ApiResponse::success(json!({ "detail": "Agent deleted" })))
}
