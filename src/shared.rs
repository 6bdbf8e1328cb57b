use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use crate::auth::{RevocationList, TokenConfig};
use crate::reimbursement::repository::{
    InMemoryReimbursementRepository, ReimbursementRepository,
};
use crate::user::repository::{InMemoryUserRepository, UserRepository};
use crate::validation::FieldIssue;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub reimbursement_repository: Arc<dyn ReimbursementRepository + Send + Sync>,
    pub token_config: TokenConfig,
    pub revoked_tokens: Arc<RevocationList>,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        reimbursement_repository: Arc<dyn ReimbursementRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            user_repository,
            reimbursement_repository,
            token_config,
            revoked_tokens: Arc::new(RevocationList::new()),
        }
    }

    /// State backed by in-memory repositories, used when no database is configured
    pub fn in_memory(token_config: TokenConfig) -> Self {
        Self::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryReimbursementRepository::new()),
            token_config,
        )
    }
}

/// `{"message": ...}` body returned by successful write endpoints
#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "User registered successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body; `details` is only present for validation failures
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Validation error")]
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldIssue>>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error")]
    Validation(Vec<FieldIssue>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation error", "details": details }),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            internal @ (AppError::JwtError(_)
            | AppError::DatabaseError(_)
            | AppError::Internal(_)) => {
                // Detail stays in the server log
                error!(error = %internal, "Request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
