//! Reset token model. Only the SHA-256 digest of a token is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored reset token record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResetToken {
    /// Hex-encoded SHA-256 digest of the raw token.
    pub token_hash: String,
    /// Account the token resets.
    pub account_id: Uuid,
    /// Instant after which the token is refused.
    pub expires_at: DateTime<Utc>,
    /// Whether the token has been used.
    pub consumed: bool,
    /// When the token was used.
    pub consumed_at: Option<DateTime<Utc>>,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
}

impl ResetToken {
    /// Classify the token at `now`.
    pub fn state_at(&self, now: DateTime<Utc>) -> ResetTokenState {
        if self.consumed {
            ResetTokenState::Consumed
        } else if now >= self.expires_at {
            ResetTokenState::Expired
        } else {
            ResetTokenState::Usable
        }
    }
}

/// Lifecycle state of a stored token at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTokenState {
    Usable,
    Expired,
    Consumed,
}

/// A freshly issued token. `token` is the only copy of the raw value.
#[derive(Debug, Clone)]
pub struct IssuedResetToken {
    /// Raw URL-safe token handed to the notifier.
    pub token: String,
    /// Account the token resets.
    pub account_id: Uuid,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}
