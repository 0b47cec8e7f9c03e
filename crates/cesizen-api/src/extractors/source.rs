//! Network origin of a request, used as the rate-limit subject for
//! unauthenticated operations.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

use crate::state::AppState;

/// The socket peer, else `unknown`. With `trust_forwarded` set, the first
/// `X-Forwarded-For` hop takes precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSource(pub String);

impl ClientSource {
    pub fn from_parts(parts: &Parts, trust_forwarded: bool) -> Self {
        if trust_forwarded {
            let forwarded = parts
                .headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|hop| !hop.is_empty());
            if let Some(hop) = forwarded {
                return Self(hop.to_string());
            }
        }

        match parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            Some(ConnectInfo(addr)) => Self(addr.ip().to_string()),
            None => Self("unknown".to_string()),
        }
    }
}

impl FromRequestParts<AppState> for ClientSource {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts, state.config.server.trust_forwarded_for))
    }
}
