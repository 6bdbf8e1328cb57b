use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::{info, instrument, warn};

use super::{token::extract_token, types::AuthClaims};
use crate::shared::{AppError, AppState};
use crate::user::models::Role;

const INVALID_TOKEN: &str = "Forbidden: Invalid token";
const INSUFFICIENT_PERMISSION: &str = "Forbidden: Insufficient Permission";

/// JWT authentication middleware - validates the Authorization header and adds AuthClaims to the request.
/// Usage: .route_layer(middleware::from_fn_with_state(app_state.clone(), auth::jwt_auth))
/// Handlers can then extract Extension(claims): Extension<AuthClaims>.
#[instrument(skip(state, req, next), fields(uri = %req.uri()))]
pub async fn jwt_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| {
            warn!("Missing Authorization header in request");
            AppError::Unauthorized("Unauthorized: Missing token".to_string())
        })?
        .to_str()
        .map_err(|_| {
            warn!("Authorization header is not valid ASCII");
            AppError::Forbidden(INVALID_TOKEN.to_string())
        })?;

    let claims = state
        .token_config
        .validate_token(extract_token(auth_header))
        .map_err(|e| {
            warn!("JWT authentication failed: {}", e);
            AppError::Forbidden(INVALID_TOKEN.to_string())
        })?;

    if state.revoked_tokens.is_revoked(&claims.jti).await {
        warn!(email = %claims.email, "Rejected token revoked by logout");
        return Err(AppError::Forbidden(INVALID_TOKEN.to_string()));
    }

    info!(email = %claims.email, "Authentication successful, adding claims to request");

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Admits callers whose stored role is `employee`; must run after `jwt_auth`
pub async fn require_employee(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_role(&state, Role::Employee, req, next).await
}

/// Admits callers whose stored role is `admin`; must run after `jwt_auth`
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_role(&state, Role::Admin, req, next).await
}

/// Re-reads the caller on every request so role changes apply immediately.
/// The loaded UserModel is added to the request for handlers.
#[instrument(skip(state, req, next), fields(required_role = %required))]
async fn require_role(
    state: &AppState,
    required: Role,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = req.extensions().get::<AuthClaims>().cloned().ok_or_else(|| {
        warn!("Role check reached without authenticated claims");
        AppError::Unauthorized("Unauthorized: Missing token".to_string())
    })?;

    let user = state
        .user_repository
        .find_by_email(&claims.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %claims.email, "Token refers to a user that no longer exists");
            AppError::Forbidden(INSUFFICIENT_PERMISSION.to_string())
        })?;

    if user.role != required {
        warn!(email = %claims.email, role = %user.role, "Insufficient role");
        return Err(AppError::Forbidden(INSUFFICIENT_PERMISSION.to_string()));
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use crate::user::models::UserModel;
    use crate::user::repository::{InMemoryUserRepository, UserRepository};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Extension, Router,
    };
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    async fn whoami(Extension(claims): Extension<AuthClaims>) -> String {
        claims.email
    }

    fn authenticated_app(state: AppState) -> Router {
        Router::new()
            .route("/me", get(whoami))
            .route_layer(from_fn_with_state(state.clone(), jwt_auth))
            .with_state(state)
    }

    fn admin_app(state: AppState) -> Router {
        Router::new()
            .route("/admin", get(whoami))
            .route_layer(from_fn_with_state(state.clone(), require_admin))
            .route_layer(from_fn_with_state(state.clone(), jwt_auth))
            .with_state(state)
    }

    fn get_with_auth(uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn seed_user(repo: &InMemoryUserRepository, email: &str, role: Role) {
        let user = UserModel::new(email.to_string(), "hash".to_string(), role, "Tester".to_string());
        repo.create_user(&user).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let app = authenticated_app(AppStateBuilder::new().build());
        let response = app.oneshot(get_with_auth("/me", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_is_forbidden() {
        let app = authenticated_app(AppStateBuilder::new().build());
        let response = app
            .oneshot(get_with_auth("/me", Some("Bearer not.a.token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_bare_and_bearer_tokens_accepted() {
        let state = AppStateBuilder::new().build();
        let token = state.token_config.create_token("ana@example.com").unwrap();

        for value in [token.clone(), format!("Bearer {token}")] {
            let response = authenticated_app(state.clone())
                .oneshot(get_with_auth("/me", Some(&value)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            assert_eq!(&body[..], b"ana@example.com");
        }
    }

    #[tokio::test]
    async fn test_revoked_token_is_forbidden() {
        let state = AppStateBuilder::new().build();
        let token = state.token_config.create_token("ana@example.com").unwrap();
        let claims = state.token_config.validate_token(&token).unwrap();
        state.revoked_tokens.revoke(&claims.jti, claims.exp).await;

        let response = authenticated_app(state)
            .oneshot(get_with_auth("/me", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_role_mismatch_is_forbidden() {
        let users = Arc::new(InMemoryUserRepository::new());
        seed_user(&users, "ana@example.com", Role::Employee).await;
        let state = AppStateBuilder::new().with_user_repository(users).build();
        let token = state.token_config.create_token("ana@example.com").unwrap();

        let response = admin_app(state)
            .oneshot(get_with_auth("/admin", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_matching_role_passes() {
        let users = Arc::new(InMemoryUserRepository::new());
        seed_user(&users, "boss@example.com", Role::Admin).await;
        let state = AppStateBuilder::new().with_user_repository(users).build();
        let token = state.token_config.create_token("boss@example.com").unwrap();

        let response = admin_app(state)
            .oneshot(get_with_auth("/admin", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_deleted_user_is_forbidden() {
        let users = Arc::new(InMemoryUserRepository::new());
        seed_user(&users, "boss@example.com", Role::Admin).await;
        let state = AppStateBuilder::new()
            .with_user_repository(users.clone())
            .build();
        let token = state.token_config.create_token("boss@example.com").unwrap();
        users.remove_user("boss@example.com").await;

        let response = admin_app(state)
            .oneshot(get_with_auth("/admin", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
