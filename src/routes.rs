//! Route definitions

use axum::{
    http::{header, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{self, jwt_auth, require_admin, require_employee};
use crate::docs::ApiDoc;
use crate::reimbursement;
use crate::shared::AppState;

/// Builds the full application router.
///
/// Layers added with `route_layer` run bottom-up, so `jwt_auth` runs before the role check.
pub fn create_router(app_state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout));

    let employee_routes = Router::new()
        .route(
            "/submit-reimbursement",
            post(reimbursement::submit_reimbursement),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_employee))
        .route_layer(from_fn_with_state(app_state.clone(), jwt_auth));

    let admin_routes = Router::new()
        .route("/admin/requests", get(reimbursement::list_requests))
        .route("/admin/requests/filter", get(reimbursement::filter_requests))
        .route(
            "/admin/requests/:id",
            patch(reimbursement::update_request_status),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_admin))
        .route_layer(from_fn_with_state(app_state.clone(), jwt_auth));

    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .merge(public_routes)
        .merge(employee_routes)
        .merge(admin_routes)
        .merge(SwaggerUi::new("/api-docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state)
}
