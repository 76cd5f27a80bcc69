// handlers/public/student.rs - Student self-service intake

use axum::extract::{Multipart, Path, State};

use crate::admission::{self, create_or_get_student_documents, StudentChoice};
use crate::database::models::{
    DocumentField, NewStudentApplication, StudentApplication, StudentDocumentField, StudentDocuments,
};
use crate::error::ApiError;
use crate::handlers::{JsonBody, UploadForm};
use crate::media::MediaKind;
use crate::middleware::{ApiResponse, ApiResult};
use crate::routes::AppState;

/// POST /student/admission-application - Submit an application without an account
///
/// The preferred university must lie in `interest_country` and offer
/// `interested_course`.
pub async fn application_post(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewStudentApplication>,
) -> ApiResult<StudentApplication> {
    let store = state.store.as_ref();
    admission::validate_student_application(store, StudentChoice::from(&payload)).await?;

    let application = store.create_student_application(payload).await?;
    tracing::info!(application_id = application.id, "Student application received");
    Ok(ApiResponse::created(application))
}

/// POST /student/application-documents/:id/upload - Attach passport or certificate scans
pub async fn documents_upload(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<StudentDocuments> {
    let store = state.store.as_ref();
    if store.get_student_application(id).await?.is_none() {
        return Err(ApiError::not_found("Admission application not found"));
    }

    let pairs = UploadForm::read(multipart)
        .await?
        .into_documents::<StudentDocumentField>()?;
    for (_, file) in &pairs {
        state.media.check(MediaKind::Document, file)?;
    }

    let batch: Vec<_> = pairs
        .iter()
        .map(|(field, file)| (format!("document_{}", field.column()), file))
        .collect();
    let paths = state.media.save_all(MediaKind::Document, &batch).await?;

    let mut documents = create_or_get_student_documents(store, id).await?;
    for ((field, _), path) in pairs.iter().zip(&paths) {
        documents = store.set_student_document(id, *field, path).await?;
    }

    Ok(ApiResponse::success(documents))
}
