// handlers/public/mod.rs - Endpoints that do not require authentication

pub mod auth;
pub mod catalog;
pub mod root;
pub mod student;

pub use auth::{login_post, register_post};
pub use catalog::{
    country_get, country_list, country_universities, course_get, course_list, university_courses,
    university_get, university_list,
};
pub use root::{health, root};
pub use student::{application_post as student_application_post, documents_upload as student_documents_upload};
