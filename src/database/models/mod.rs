pub mod application;
pub mod catalog;
pub mod commission;
pub mod documents;
pub mod student;
pub mod user;

pub use application::{AgentApplication, AgentApplicationFilter, AgentApplicationPatch, NewAgentApplication};
pub use catalog::{
    Country, CountryPatch, Course, CoursePatch, NewCountry, NewCourse, NewUniversity, University,
    UniversityPatch,
};
pub use commission::{Commission, CommissionPatch};
pub use documents::{AgentDocumentField, AgentDocuments, DocumentField, StudentDocumentField, StudentDocuments};
pub use student::{NewStudentApplication, StudentApplication, StudentApplicationPatch};
pub use user::{NewProfile, NewUser, ProfilePatch, User, UserProfile};
