use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::ReimbursementModel,
    service::ReimbursementService,
    types::{RequestFilter, StatusUpdateRequest, SubmitReimbursementRequest},
};
use crate::shared::{AppError, AppState, ErrorResponse, MessageResponse};
use crate::user::models::UserModel;
use crate::validation;

fn reimbursement_service(state: &AppState) -> ReimbursementService {
    ReimbursementService::new(Arc::clone(&state.reimbursement_repository))
}

/// Submit a reimbursement request as the authenticated employee
#[utoipa::path(
    post,
    path = "/submit-reimbursement",
    tag = "employee",
    request_body = SubmitReimbursementRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Request submitted", body = MessageResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Missing token", body = ErrorResponse),
        (status = 403, description = "Invalid token or not an employee", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(name = "submit_reimbursement", skip(state, user, payload), fields(email = %user.email))]
pub async fn submit_reimbursement(
    State(state): State<AppState>,
    Extension(user): Extension<UserModel>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let body = validation::json_body(payload)?;
    let request = validation::reimbursement(&body)?;
    let stored = reimbursement_service(&state).submit(request, &user).await?;

    info!(request_id = %stored.id, "Reimbursement request submitted");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Reimbursement request submitted successfully",
        )),
    ))
}

/// List every reimbursement request
#[utoipa::path(
    get,
    path = "/admin/requests",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All requests", body = [ReimbursementModel]),
        (status = 401, description = "Missing token", body = ErrorResponse),
        (status = 403, description = "Invalid token or not an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(name = "list_requests", skip(state))]
pub async fn list_requests(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReimbursementModel>>, AppError> {
    let requests = reimbursement_service(&state).list_all().await?;

    info!(count = requests.len(), "Listed reimbursement requests");
    Ok(Json(requests))
}

/// Filter requests by employee name and/or status
#[utoipa::path(
    get,
    path = "/admin/requests/filter",
    tag = "admin",
    params(RequestFilter),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Matching requests, possibly empty", body = [ReimbursementModel]),
        (status = 401, description = "Missing token", body = ErrorResponse),
        (status = 403, description = "Invalid token or not an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(name = "filter_requests", skip(state))]
pub async fn filter_requests(
    State(state): State<AppState>,
    Query(filter): Query<RequestFilter>,
) -> Result<Json<Vec<ReimbursementModel>>, AppError> {
    let requests = reimbursement_service(&state).filter(filter).await?;

    info!(count = requests.len(), "Filtered reimbursement requests");
    Ok(Json(requests))
}

/// Approve or reject a request
#[utoipa::path(
    patch,
    path = "/admin/requests/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Reimbursement request id")),
    request_body = StatusUpdateRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status updated", body = MessageResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Missing token", body = ErrorResponse),
        (status = 403, description = "Invalid token or not an admin", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(name = "update_request_status", skip(state, payload))]
pub async fn update_request_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let body = validation::json_body(payload)?;
    let StatusUpdateRequest { status } = validation::status_update(&body)?;
    reimbursement_service(&state)
        .update_status(&id, status)
        .await?;

    Ok(Json(MessageResponse::new(format!(
        "Reimbursement request {status} successfully"
    ))))
}
