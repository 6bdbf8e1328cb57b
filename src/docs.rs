//! OpenAPI description of the HTTP API, served through Swagger UI at `/api-docs`

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

use crate::auth::types::{LoginRequest, RegisterRequest, TokenResponse};
use crate::reimbursement::models::{
    OutOfPocket, PaymentType, RaisedBy, ReimbursementModel, RequestStatus,
};
use crate::reimbursement::types::{StatusUpdateRequest, SubmitReimbursementRequest};
use crate::shared::{ErrorResponse, MessageResponse};
use crate::user::models::Role;
use crate::validation::FieldIssue;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::logout,
        crate::reimbursement::handlers::submit_reimbursement,
        crate::reimbursement::handlers::list_requests,
        crate::reimbursement::handlers::filter_requests,
        crate::reimbursement::handlers::update_request_status
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            TokenResponse,
            Role,
            SubmitReimbursementRequest,
            StatusUpdateRequest,
            ReimbursementModel,
            RaisedBy,
            PaymentType,
            OutOfPocket,
            RequestStatus,
            MessageResponse,
            ErrorResponse,
            FieldIssue
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and logout"),
        (name = "employee", description = "Endpoints for employees"),
        (name = "admin", description = "Review of reimbursement requests")
    ),
    info(
        title = "Reimbursement API",
        version = "0.1.0",
        description = "Submit employee reimbursement requests and approve or reject them."
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    )
)]
pub struct ApiDoc;

/// Registers the `Authorization` header scheme; the raw header value may be a bare token or `Bearer <token>`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Authorization"))),
            );
        }
    }
}
