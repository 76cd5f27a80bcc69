// handlers/protected/agent/application.rs - Agent admission applications

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::admission::{self, create_or_get_commission, parse_status, Selection};
use crate::database::models::{
    AgentApplication, AgentApplicationFilter, AgentApplicationPatch, NewAgentApplication,
};
use crate::database::Store;
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::routes::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

fn not_found() -> ApiError {
    ApiError::not_found("Admission application not found.")
}

/// Load an application the caller may see; others' applications read as missing
async fn visible_application(
    store: &dyn Store,
    user: &AuthUser,
    id: i32,
) -> Result<AgentApplication, ApiError> {
    match store.get_agent_application(id).await? {
        Some(application) if user.can_access_application(application.agent_id) => Ok(application),
        _ => Err(not_found()),
    }
}

/// POST /agent/admission-application - Submit an application on a student's behalf
///
/// Runs the university selection rules, then creates the zeroed commission
/// record alongside the application.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(payload): JsonBody<NewAgentApplication>,
) -> ApiResult<AgentApplication> {
    user.require_active_agent()?;
    let store = state.store.as_ref();

    let selection = Selection::from(&payload);
    let validated = admission::validate_agent_application(store, &state.admission, &selection).await?;

    let application = store.create_agent_application(user.id, payload).await?;
    create_or_get_commission(store, application.id).await?;

    tracing::info!(
        application_id = application.id,
        agent_id = user.id,
        universities = validated.universities.len(),
        "Agent application submitted"
    );
    Ok(ApiResponse::created(application))
}

/// GET /agent/admission-application - Applications visible to the caller, optionally by status
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<AgentApplication>> {
    user.require_active()?;

    let status = query.status.as_deref().map(parse_status).transpose()?;
    let filter = AgentApplicationFilter {
        agent_id: if user.is_admin() { None } else { Some(user.id) },
        status,
        ..Default::default()
    };

    let applications = state.store.list_agent_applications(&filter).await?;
    if applications.is_empty() {
        return Err(ApiError::not_found("No admission applications found."));
    }
    Ok(ApiResponse::success(applications))
}

/// GET /agent/admission-application/:id - One application (admins: any; agents: own)
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<AgentApplication> {
    user.require_active()?;
    let application = visible_application(state.store.as_ref(), &user, id).await?;
    Ok(ApiResponse::success(application))
}

/// PATCH /agent/admission-application/:id - Partial update
///
/// Only patches touching the university, course or country fields are
/// re-validated, against the stored row merged with the patch.
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    JsonBody(patch): JsonBody<AgentApplicationPatch>,
) -> ApiResult<AgentApplication> {
    user.require_active()?;
    let store = state.store.as_ref();
    let current = visible_application(store, &user, id).await?;

    admission::validate_agent_update(store, &state.admission, &current, &patch).await?;
    if let Some(status) = patch.status {
        admission::record_transition(id, current.status, status);
    }

    let application = store.update_agent_application(id, &patch).await?;
    Ok(ApiResponse::success(application))
}

/// DELETE /agent/admission-application/:id - Remove an application with its documents and commission
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<Value> {
    user.require_active()?;
    let store = state.store.as_ref();
    visible_application(store, &user, id).await?;

    store.delete_agent_application(id).await?;
    tracing::info!(application_id = id, deleted_by = user.id, "Agent application deleted");
    Ok(ApiResponse::success(json!({ "detail": "Admission application deleted." })))
}
