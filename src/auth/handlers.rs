use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::AuthService,
    types::{LoginRequest, RegisterRequest, TokenResponse},
};
use crate::shared::{AppError, AppState, ErrorResponse, MessageResponse};
use crate::validation;

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(
        Arc::clone(&state.user_repository),
        state.token_config.clone(),
        Arc::clone(&state.revoked_tokens),
    )
}

/// Register a new employee or admin account
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = MessageResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(name = "register", skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let body = validation::json_body(payload)?;
    let request = validation::registration(&body)?;
    let user = auth_service(&state).register(request).await?;

    info!(user_id = %user.id, "Registration complete");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// Exchange credentials for a token
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = TokenResponse),
        (status = 401, description = "Invalid username or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(name = "login", skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    // An unreadable body carries no credentials and fails like one without them
    let body = payload.map(|Json(body)| body).unwrap_or(Value::Null);
    let token = auth_service(&state)
        .login(validation::credentials(&body))
        .await?;
    Ok(Json(TokenResponse { token }))
}

/// Log out; a presented token is revoked, the call itself always succeeds
#[utoipa::path(
    post,
    path = "/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse)
    )
)]
#[instrument(name = "logout", skip(state, headers))]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<MessageResponse> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    auth_service(&state).logout(auth_header).await;

    Json(MessageResponse::new("Logout successful"))
}
