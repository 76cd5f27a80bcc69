//! Consistency rules applied before admission applications are written.
//!
//! Validators read the catalog through the [`Store`](crate::database::Store)
//! trait and never write; the only writes here are the lazy get-or-create
//! helpers for the per-application commission and documents records.

pub mod lazy;
pub mod status;
pub mod validator;

use thiserror::Error;

use crate::database::StoreError;

pub use lazy::{
    create_or_get_agent_documents, create_or_get_commission, create_or_get_student_documents,
    get_or_create,
};
pub use status::{parse_status, record_transition, Transition};
pub use validator::{
    validate_agent_application, validate_agent_update, validate_course_change,
    validate_student_application, validate_student_update, validate_university_change, Selection,
    StudentChoice, ValidatedSelection,
};

#[derive(Debug, Error)]
pub enum AdmissionError {
    /// A referenced id or name does not resolve
    #[error("{0}")]
    NotFound(String),

    /// A business rule rejected the payload
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AdmissionError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AdmissionError::NotFound(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        AdmissionError::InvalidRequest(message.into())
    }
}
