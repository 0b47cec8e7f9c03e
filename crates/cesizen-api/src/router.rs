//! Route definitions for the CESIZen HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes(state.clone()))
        .merge(user_routes(state.clone()))
        .merge(admin_routes(state.clone()))
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Registration, login, password reset and token resolution
fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/verify", get(handlers::auth::verify))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::rbac::require_visitor,
        ));

    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/auth/password-reset/request",
            post(handlers::password_reset::request_reset),
        )
        .route(
            "/auth/password-reset/confirm",
            post(handlers::password_reset::confirm_reset),
        )
        .merge(protected)
}

/// User self-service endpoints
fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/users/me",
            get(handlers::user::get_profile).put(handlers::user::update_profile),
        )
        .route("/users/me/password", put(handlers::user::change_password))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::rbac::require_visitor,
        ))
}

/// Admin account management
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(handlers::admin::users::list_users))
        .route(
            "/admin/users/by-identity/{identity}",
            get(handlers::admin::users::get_user_by_identity),
        )
        .route(
            "/admin/users/{id}",
            get(handlers::admin::users::get_user)
                .put(handlers::admin::users::update_user)
                .delete(handlers::admin::users::delete_user),
        )
        .route(
            "/admin/users/{id}/role",
            put(handlers::admin::users::change_role),
        )
        .route(
            "/admin/users/{id}/status",
            put(handlers::admin::users::change_status),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::rbac::require_admin,
        ))
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
