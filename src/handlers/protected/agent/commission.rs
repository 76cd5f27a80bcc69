// handlers/protected/agent/commission.rs - Commission bookkeeping

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::admission::create_or_get_commission;
use crate::database::models::{Commission, CommissionPatch};
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::routes::AppState;

/// PATCH /agent/commission/:id - Set fee, commission and rate for an application
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(application_id): Path<i32>,
    JsonBody(patch): JsonBody<CommissionPatch>,
) -> ApiResult<Commission> {
    user.require_admin()?;
    let store = state.store.as_ref();

    if store.get_agent_application(application_id).await?.is_none() {
        return Err(ApiError::not_found("Admission application not found"));
    }
    for (name, value) in [
        ("student_fee", patch.student_fee),
        ("commission", patch.commission),
        ("commission_rate", patch.commission_rate),
    ] {
        if value.is_some_and(|v| v < 0) {
            return Err(ApiError::validation_error(
                format!("{} must not be negative", name),
                None,
            ));
        }
    }

    // Applications created before commissions were tracked have no row yet
    create_or_get_commission(store, application_id).await?;
    let commission = store.update_commission(application_id, &patch).await?;
    Ok(ApiResponse::success(commission))
}
