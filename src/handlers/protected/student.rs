// handlers/protected/student.rs - Admin review of student applications

use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::{json, Value};

use crate::admission;
use crate::database::models::{StudentApplication, StudentApplicationPatch};
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::routes::AppState;

fn not_found() -> ApiError {
    ApiError::not_found("Admission application not found.")
}

/// GET /student/admission-application - Every student application
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<StudentApplication>> {
    user.require_admin()?;
    let applications = state.store.list_student_applications().await?;
    if applications.is_empty() {
        return Err(ApiError::not_found("No admission applications found."));
    }
    Ok(ApiResponse::success(applications))
}

/// GET /student/admission-application/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<StudentApplication> {
    user.require_admin()?;
    state
        .store
        .get_student_application(id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(not_found)
}

/// PATCH /student/admission-application/:id - Partial update
///
/// When the university, country or course changes, the stored values fill in
/// whatever the patch omits before the catalog rules run again.
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    JsonBody(patch): JsonBody<StudentApplicationPatch>,
) -> ApiResult<StudentApplication> {
    user.require_admin()?;
    let store = state.store.as_ref();
    let current = store.get_student_application(id).await?.ok_or_else(not_found)?;

    admission::validate_student_update(store, &current, &patch).await?;
    let application = store.update_student_application(id, &patch).await?;
    Ok(ApiResponse::success(application))
}

/// DELETE /student/admission-application/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<Value> {
    user.require_admin()?;
    state.store.delete_student_application(id).await?;
    tracing::info!(application_id = id, "Student application deleted");
    Ok(ApiResponse::success(json!({ "detail": "Admission application deleted." })))
}
