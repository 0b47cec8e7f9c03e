//! Bearer token resolution for protected operations.
//!
//! Every verification failure leaves here as a single `Unauthorized`
//! error; the specific cause is logged and kept as the error source.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use cesizen_core::error::{AppError, ErrorKind};
use cesizen_entity::account::AccountRole;

use crate::jwt::JwtDecoder;
use crate::rbac::RbacEnforcer;

/// The authenticated caller of a protected operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub account_id: Uuid,
    pub role: AccountRole,
    pub token_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Resolves bearer tokens into principals and checks required roles.
#[derive(Debug, Clone)]
pub struct Authorizer {
    decoder: Arc<JwtDecoder>,
    rbac: RbacEnforcer,
}

impl Authorizer {
    pub fn new(decoder: Arc<JwtDecoder>) -> Self {
        Self {
            decoder,
            rbac: RbacEnforcer::new(),
        }
    }

    /// Resolves the value of an `Authorization` header.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Principal, AppError> {
        let header = authorization
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("Authorization header is not a bearer token"))?;

        self.resolve(token)
    }

    /// Verifies a raw token.
    pub fn resolve(&self, token: &str) -> Result<Principal, AppError> {
        match self.decoder.verify(token) {
            Ok(claims) => Ok(Principal {
                account_id: claims.sub,
                role: claims.role,
                token_id: claims.jti,
                expires_at: claims.expires_at(),
            }),
            Err(e) => {
                debug!(reason = %e.kind, detail = %e.message, "Session token rejected");
                Err(AppError::with_source(
                    ErrorKind::Unauthorized,
                    "Invalid session token",
                    e,
                ))
            }
        }
    }

    /// Resolves the header and requires at least `minimum`.
    pub fn authorize(
        &self,
        authorization: Option<&str>,
        minimum: AccountRole,
    ) -> Result<Principal, AppError> {
        let principal = self.authenticate(authorization)?;
        self.rbac.require_minimum_role(principal.role, minimum)?;
        Ok(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtEncoder;
    use cesizen_core::config::AuthConfig;
    use cesizen_core::{Clock, ManualClock};
    use chrono::Duration;

    fn setup() -> (ManualClock, JwtEncoder, Authorizer) {
        let clock = ManualClock::starting_now();
        let config = AuthConfig {
            signing_secret: "authorizer-test-secret-0123456789abcdef".into(),
            ..AuthConfig::default()
        };
        let shared: Arc<dyn Clock> = Arc::new(clock.clone());
        let encoder = JwtEncoder::new(&config, Arc::clone(&shared));
        let authorizer = Authorizer::new(Arc::new(JwtDecoder::new(&config, shared)));
        (clock, encoder, authorizer)
    }

    #[test]
    fn test_resolves_principal() {
        let (_, encoder, authorizer) = setup();
        let id = Uuid::new_v4();
        let issued = encoder.issue(id, AccountRole::User).unwrap();

        let principal = authorizer
            .authenticate(Some(&format!("Bearer {}", issued.token)))
            .unwrap();
        assert_eq!(principal.account_id, id);
        assert_eq!(principal.role, AccountRole::User);
    }

    #[test]
    fn test_failures_are_uniform() {
        let (clock, encoder, authorizer) = setup();
        let issued = encoder.issue(Uuid::new_v4(), AccountRole::User).unwrap();
        clock.advance(Duration::hours(1));

        let expired = format!("Bearer {}", issued.token);
        for header in [None, Some("Basic abc"), Some("Bearer garbage"), Some(expired.as_str())] {
            let err = authorizer.authenticate(header).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Unauthorized);
        }
    }

    #[test]
    fn test_authorize_checks_role() {
        let (_, encoder, authorizer) = setup();
        let issued = encoder.issue(Uuid::new_v4(), AccountRole::User).unwrap();
        let header = format!("Bearer {}", issued.token);

        assert!(authorizer.authorize(Some(&header), AccountRole::Visitor).is_ok());
        let err = authorizer
            .authorize(Some(&header), AccountRole::Admin)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }
}
