use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::user::models::Role;

/// JWT claims carried by every issued token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthClaims {
    pub email: String,
    pub jti: String, // Token id, the key used for revocation on logout
    pub exp: usize,  // Expiration timestamp (standard JWT claim)
    pub iat: usize,  // Issued at timestamp (standard JWT claim)
}

/// Registration body, produced by `validation::registration`
#[derive(Debug, Clone, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "ana@example.com")]
    pub email: String,
    /// At least 8 characters
    #[schema(example = "correct-horse")]
    pub password: String,
    pub role: Role,
    /// Display name, at least 3 characters
    #[schema(example = "Ana")]
    pub fname: String,
}

/// Login body, produced by `validation::credentials`; fields are only checked for presence
#[derive(Debug, Clone, Default, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ana@example.com")]
    pub email: Option<String>,
    #[schema(example = "correct-horse")]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}
