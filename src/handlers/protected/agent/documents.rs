// handlers/protected/agent/documents.rs - Application document uploads

use axum::{
    extract::{Multipart, Path, State},
    Extension,
};

use crate::admission::create_or_get_agent_documents;
use crate::database::models::{AgentDocumentField, AgentDocuments, DocumentField};
use crate::error::ApiError;
use crate::handlers::UploadForm;
use crate::media::MediaKind;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::routes::AppState;

/// POST /agent/application-documents/:id/upload - Attach scans to an own application
///
/// Multipart: one `files` part per document plus `field_names`, a
/// comma-delimited list naming the slot of each file in order. Every file is
/// checked and saved before any path is recorded.
pub async fn upload(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<AgentDocuments> {
    user.require_active_agent()?;
    let store = state.store.as_ref();

    let owned = store
        .get_agent_application(id)
        .await?
        .is_some_and(|application| application.agent_id == Some(user.id));
    if !owned {
        return Err(ApiError::not_found("Admission application not found"));
    }

    let pairs = UploadForm::read(multipart)
        .await?
        .into_documents::<AgentDocumentField>()?;
    for (_, file) in &pairs {
        state.media.check(MediaKind::Document, file)?;
    }

    let batch: Vec<_> = pairs
        .iter()
        .map(|(field, file)| (format!("document_{}", field.column()), file))
        .collect();
    let paths = state.media.save_all(MediaKind::Document, &batch).await?;

    let mut documents = create_or_get_agent_documents(store, id).await?;
    for ((field, _), path) in pairs.iter().zip(&paths) {
        documents = store.set_agent_document(id, *field, path).await?;
    }

    tracing::info!(application_id = id, files = pairs.len(), "Agent documents uploaded");
    Ok(ApiResponse::success(documents))
}
