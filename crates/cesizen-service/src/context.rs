//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use cesizen_auth::Principal;
use cesizen_entity::account::AccountRole;

/// Context for the current authenticated request.
///
/// Built by the HTTP layer from a verified [`Principal`] and passed into
/// service methods so every operation knows who is acting.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    /// The caller's account ID.
    pub account_id: Uuid,
    /// The caller's role at token issuance.
    pub role: AccountRole,
    /// Token ID of the presented session token.
    pub token_id: Uuid,
    /// Network address of the request origin.
    pub source: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for `principal` calling from `source`.
    pub fn new(principal: &Principal, source: impl Into<String>) -> Self {
        Self {
            account_id: principal.account_id,
            role: principal.role,
            token_id: principal.token_id,
            source: source.into(),
            request_time: Utc::now(),
        }
    }
}
