use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{
    AgentApplication, AgentApplicationFilter, AgentApplicationPatch, AgentDocumentField,
    AgentDocuments, Commission, CommissionPatch, Country, CountryPatch, Course, CoursePatch,
    NewAgentApplication, NewCountry, NewCourse, NewProfile, NewStudentApplication, NewUniversity,
    NewUser, ProfilePatch, StudentApplication, StudentApplicationPatch, StudentDocumentField,
    StudentDocuments, University, UniversityPatch, User, UserProfile,
};

/// Errors surfaced by every store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A unique constraint rejected the write
    #[error("already exists: {0}")]
    Conflict(String),

    /// A foreign key does not resolve
    #[error("referenced record does not exist: {0}")]
    InvalidReference(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound("record"),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            sqlx::Error::Database(db) => {
                let constraint = db.constraint().unwrap_or("constraint").to_string();
                match db.code().as_deref() {
                    Some("23505") => StoreError::Conflict(constraint),
                    Some("23503") => StoreError::InvalidReference(constraint),
                    _ => StoreError::Sqlx(err),
                }
            }
            _ => StoreError::Sqlx(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract for every entity the service owns.
///
/// Implementations enforce the same referential policies:
/// country -> university -> course cascade, university -> student application
/// cascade, and set-null for every agent application reference. Updates apply
/// only the `Some` fields of a patch. Deletes and updates of a missing row
/// return [`StoreError::NotFound`].
#[async_trait]
pub trait Store: Send + Sync {
    // Countries
    async fn create_country(&self, new: NewCountry) -> StoreResult<Country>;
    async fn get_country(&self, id: i32) -> StoreResult<Option<Country>>;
    /// Case-insensitive exact match
    async fn find_country_by_name(&self, name: &str) -> StoreResult<Option<Country>>;
    async fn list_countries(&self) -> StoreResult<Vec<Country>>;
    async fn update_country(&self, id: i32, patch: &CountryPatch) -> StoreResult<Country>;
    async fn delete_country(&self, id: i32) -> StoreResult<()>;

    // Universities
    async fn create_university(&self, new: NewUniversity) -> StoreResult<University>;
    async fn get_university(&self, id: i32) -> StoreResult<Option<University>>;
    async fn list_universities(&self, country_id: Option<i32>) -> StoreResult<Vec<University>>;
    async fn update_university(&self, id: i32, patch: &UniversityPatch) -> StoreResult<University>;
    async fn set_university_image(&self, id: i32, path: &str) -> StoreResult<University>;
    async fn delete_university(&self, id: i32) -> StoreResult<()>;

    // Courses
    async fn create_course(&self, new: NewCourse) -> StoreResult<Course>;
    async fn get_course(&self, id: i32) -> StoreResult<Option<Course>>;
    async fn list_courses(&self, university_id: Option<i32>) -> StoreResult<Vec<Course>>;
    /// Case-insensitive exact match; names are not unique
    async fn find_courses_by_name(&self, name: &str) -> StoreResult<Vec<Course>>;
    async fn update_course(&self, id: i32, patch: &CoursePatch) -> StoreResult<Course>;
    async fn set_course_image(&self, id: i32, path: &str) -> StoreResult<Course>;
    async fn delete_course(&self, id: i32) -> StoreResult<()>;

    // Users
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;
    async fn get_user(&self, id: i32) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self, is_admin: Option<bool>) -> StoreResult<Vec<User>>;
    async fn set_user_verified(&self, id: i32, verified: bool) -> StoreResult<User>;
    async fn delete_user(&self, id: i32) -> StoreResult<()>;

    // Profiles, keyed by owning user
    async fn create_profile(&self, user_id: i32, new: NewProfile) -> StoreResult<UserProfile>;
    async fn get_profile(&self, user_id: i32) -> StoreResult<Option<UserProfile>>;
    async fn update_profile(&self, user_id: i32, patch: &ProfilePatch) -> StoreResult<UserProfile>;
    async fn set_profile_file(&self, user_id: i32, path: Option<&str>) -> StoreResult<UserProfile>;
    async fn delete_profile(&self, user_id: i32) -> StoreResult<()>;

    // Agent applications
    async fn create_agent_application(
        &self,
        agent_id: i32,
        new: NewAgentApplication,
    ) -> StoreResult<AgentApplication>;
    async fn get_agent_application(&self, id: i32) -> StoreResult<Option<AgentApplication>>;
    async fn list_agent_applications(
        &self,
        filter: &AgentApplicationFilter,
    ) -> StoreResult<Vec<AgentApplication>>;
    async fn update_agent_application(
        &self,
        id: i32,
        patch: &AgentApplicationPatch,
    ) -> StoreResult<AgentApplication>;
    async fn delete_agent_application(&self, id: i32) -> StoreResult<()>;

    // Commission, keyed by application
    async fn get_commission(&self, application_id: i32) -> StoreResult<Option<Commission>>;
    /// Inserts a zeroed row; `Conflict` when one already exists
    async fn insert_commission(&self, application_id: i32) -> StoreResult<Commission>;
    async fn update_commission(
        &self,
        application_id: i32,
        patch: &CommissionPatch,
    ) -> StoreResult<Commission>;

    // Agent application documents, keyed by application
    async fn get_agent_documents(&self, application_id: i32) -> StoreResult<Option<AgentDocuments>>;
    async fn insert_agent_documents(&self, application_id: i32) -> StoreResult<AgentDocuments>;
    async fn set_agent_document(
        &self,
        application_id: i32,
        field: AgentDocumentField,
        path: &str,
    ) -> StoreResult<AgentDocuments>;

    // Student applications
    async fn create_student_application(
        &self,
        new: NewStudentApplication,
    ) -> StoreResult<StudentApplication>;
    async fn get_student_application(&self, id: i32) -> StoreResult<Option<StudentApplication>>;
    async fn list_student_applications(&self) -> StoreResult<Vec<StudentApplication>>;
    async fn list_student_applications_for_university(
        &self,
        university_id: i32,
    ) -> StoreResult<Vec<StudentApplication>>;
    async fn update_student_application(
        &self,
        id: i32,
        patch: &StudentApplicationPatch,
    ) -> StoreResult<StudentApplication>;
    async fn delete_student_application(&self, id: i32) -> StoreResult<()>;

    // Student application documents, keyed by application
    async fn get_student_documents(
        &self,
        application_id: i32,
    ) -> StoreResult<Option<StudentDocuments>>;
    async fn insert_student_documents(&self, application_id: i32) -> StoreResult<StudentDocuments>;
    async fn set_student_document(
        &self,
        application_id: i32,
        field: StudentDocumentField,
        path: &str,
    ) -> StoreResult<StudentDocuments>;

    /// Cheap round trip used by `/health`
    async fn ping(&self) -> StoreResult<()>;
}
