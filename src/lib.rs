// Library crate for the reimbursement service
// This file exposes the public API for integration tests

pub mod auth;
pub mod config;
pub mod docs;
pub mod reimbursement;
pub mod routes;
pub mod shared;
pub mod user;
pub mod validation;

// Re-export commonly used types for easier access in tests
pub use auth::{AuthClaims, TokenConfig};
pub use config::Config;
pub use routes::create_router;
pub use shared::{AppError, AppState};
