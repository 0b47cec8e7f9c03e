//! Role guard for route groups.
//!
//! Handlers still receive an [`AuthUser`](crate::extractors::AuthUser); the
//! guard rejects callers below the group's role before any handler runs.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use cesizen_entity::account::AccountRole;

use crate::error::ApiError;
use crate::state::AppState;

async fn require_role(
    state: &AppState,
    request: Request,
    next: Next,
    minimum: AccountRole,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    state.authorizer.authorize(header, minimum)?;
    Ok(next.run(request).await)
}

/// Admits admin callers only.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    require_role(&state, request, next, AccountRole::Admin).await
}

/// Admits any authenticated caller.
pub async fn require_visitor(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    require_role(&state, request, next, AccountRole::Visitor).await
}
