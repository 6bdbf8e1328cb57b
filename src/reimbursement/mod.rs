// Public API - what other modules can use
pub use handlers::{filter_requests, list_requests, submit_reimbursement, update_request_status};

pub(crate) mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
