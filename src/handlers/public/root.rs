// handlers/public/root.rs - Service banner and health check

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::routes::AppState;

/// GET / - Service name, version and endpoint map
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Abroad Admission API",
            "version": version,
            "description": "Study-abroad admission backend: catalog, agent and student applications",
            "endpoints": {
                "health": "/health (public)",
                "users": "/users/register, /users/login (public); /users/* (protected)",
                "catalog": "/country, /university, /course (public reads, admin writes)",
                "agent": "/agent/admission-application, /agent/application-documents, /agent/commission (protected)",
                "student": "/student/admission-application, /student/application-documents (public intake, admin review)",
                "media": "/media/* (public files)",
            }
        }
    }))
}

/// GET /health - Store connectivity check
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                    }
                })),
            )
        }
    }
}
