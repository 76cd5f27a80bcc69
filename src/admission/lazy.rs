use std::future::Future;

use tracing::debug;

use super::AdmissionError;
use crate::database::models::{AgentDocuments, Commission, StudentDocuments};
use crate::database::{Store, StoreError, StoreResult};

/// Fetch a record, inserting it when absent.
///
/// Concurrent callers may both see nothing and both insert; the store's unique
/// constraint lets exactly one insert through and the loser re-reads the
/// winner's row, so every caller gets the same record.
pub async fn get_or_create<T, Fetch, FetchFut, Insert, InsertFut>(
    fetch: Fetch,
    insert: Insert,
) -> StoreResult<T>
where
    Fetch: Fn() -> FetchFut,
    FetchFut: Future<Output = StoreResult<Option<T>>>,
    Insert: FnOnce() -> InsertFut,
    InsertFut: Future<Output = StoreResult<T>>,
{
    if let Some(existing) = fetch().await? {
        return Ok(existing);
    }

    match insert().await {
        Ok(created) => Ok(created),
        Err(StoreError::Conflict(constraint)) => {
            debug!(%constraint, "insert lost a get-or-create race, re-reading");
            fetch().await?.ok_or(StoreError::NotFound("record"))
        }
        Err(err) => Err(err),
    }
}

fn missing_application(err: StoreError, application_id: i32) -> AdmissionError {
    match err {
        StoreError::InvalidReference(_) => {
            AdmissionError::not_found(format!("Application {} not found", application_id))
        }
        other => other.into(),
    }
}

/// Exactly one commission row per agent application, created on first use
pub async fn create_or_get_commission(
    store: &dyn Store,
    application_id: i32,
) -> Result<Commission, AdmissionError> {
    get_or_create(
        || store.get_commission(application_id),
        || store.insert_commission(application_id),
    )
    .await
    .map_err(|err| missing_application(err, application_id))
}

pub async fn create_or_get_agent_documents(
    store: &dyn Store,
    application_id: i32,
) -> Result<AgentDocuments, AdmissionError> {
    get_or_create(
        || store.get_agent_documents(application_id),
        || store.insert_agent_documents(application_id),
    )
    .await
    .map_err(|err| missing_application(err, application_id))
}

pub async fn create_or_get_student_documents(
    store: &dyn Store,
    application_id: i32,
) -> Result<StudentDocuments, AdmissionError> {
    get_or_create(
        || store.get_student_documents(application_id),
        || store.insert_student_documents(application_id),
    )
    .await
    .map_err(|err| missing_application(err, application_id))
}
