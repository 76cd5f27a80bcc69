// handlers/protected/mod.rs - Endpoints behind the JWT middleware
//
// The middleware only establishes who the caller is (`AuthUser`); each
// handler states the role it needs before touching the store.

pub mod agent;
pub mod catalog;
pub mod profile;
pub mod student;
pub mod users;

pub use agent::*;
pub use catalog::{
    country_delete, country_patch, country_post, course_delete, course_image_upload, course_patch,
    course_post, university_delete, university_image_upload, university_patch, university_post,
};
pub use profile::{
    create as profile_post, delete as profile_delete, file_delete as profile_file_delete,
    file_upload as profile_file_upload, get as profile_get, update as profile_patch,
};
pub use student::{
    delete as student_application_delete, get as student_application_get,
    list as student_application_list, update as student_application_patch,
};
pub use users::{
    admin_delete, admin_register as admin_register_post, agent_delete, agent_get, agent_list,
    agent_patch, delete_user as user_delete, me as me_get,
};
