// handlers/mod.rs - Two-tier handler layout
//
// public:    no authentication (catalog reads, accounts, student intake)
// protected: bearer token required; role checks happen inside each handler

pub mod extract;
pub mod protected;
pub mod public;

pub use extract::{JsonBody, UploadForm};
