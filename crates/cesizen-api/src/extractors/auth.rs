//! `AuthUser` extractor: pulls the bearer token from the Authorization
//! header, verifies it, and injects the request context.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use cesizen_auth::Principal;
use cesizen_service::context::RequestContext;

use crate::error::ApiError;
use crate::extractors::source::ClientSource;
use crate::state::AppState;

/// Extracted authenticated caller available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The verified token subject.
    pub principal: Principal,
    ctx: RequestContext,
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.ctx
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let principal = state.authorizer.authenticate(header)?;
        let ClientSource(source) =
            ClientSource::from_parts(parts, state.config.server.trust_forwarded_for);

        Ok(AuthUser {
            principal,
            ctx: RequestContext::new(&principal, source),
        })
    }
}
