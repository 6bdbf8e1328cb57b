// Public API - what other modules can use
pub use handlers::{login, logout, register};
pub use middleware::{jwt_auth, require_admin, require_employee};
pub use revocation::RevocationList;
pub use token::TokenConfig;
pub use types::AuthClaims;

// Internal modules
pub(crate) mod handlers;
mod middleware;
mod password;
mod revocation;
pub mod service;
mod token;
pub mod types;
