// handlers/protected/agent/mod.rs - /agent/* endpoints

pub mod application;
pub mod commission;
pub mod documents;

pub use application::{
    create as agent_application_post, delete as agent_application_delete,
    get as agent_application_get, list as agent_application_list,
    update as agent_application_patch,
};
pub use commission::update as commission_patch;
pub use documents::upload as agent_documents_upload;
