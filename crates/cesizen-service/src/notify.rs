//! Delivery of password-reset tokens to account holders.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use cesizen_core::result::AppResult;
use cesizen_entity::account::Account;
use cesizen_entity::reset_token::IssuedResetToken;

/// Receives every reset token actually issued.
///
/// Only called when the requested identity exists; callers of the reset
/// request cannot observe whether dispatch happened.
#[async_trait]
pub trait ResetNotifier: Send + Sync + std::fmt::Debug + 'static {
    async fn dispatch(&self, account: &Account, token: &IssuedResetToken) -> AppResult<()>;
}

/// Logs issuance. The raw token is written only when `expose_tokens` is on,
/// which is meant for local development.
#[derive(Debug, Clone)]
pub struct LoggingResetNotifier {
    expose_tokens: bool,
}

impl LoggingResetNotifier {
    pub fn new(expose_tokens: bool) -> Self {
        Self { expose_tokens }
    }
}

#[async_trait]
impl ResetNotifier for LoggingResetNotifier {
    async fn dispatch(&self, account: &Account, token: &IssuedResetToken) -> AppResult<()> {
        if self.expose_tokens {
            info!(
                account_id = %account.id,
                expires_at = %token.expires_at,
                reset_token = %token.token,
                "Password reset token issued"
            );
        } else {
            info!(
                account_id = %account.id,
                expires_at = %token.expires_at,
                "Password reset token issued"
            );
        }
        Ok(())
    }
}

/// A delivered reset message held by [`OutboxResetNotifier`].
#[derive(Debug, Clone)]
pub struct OutboxMessage {
    pub account_id: Uuid,
    pub identity: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Keeps dispatched tokens in memory so they can be read back.
#[derive(Debug, Default)]
pub struct OutboxResetNotifier {
    messages: Mutex<Vec<OutboxMessage>>,
}

impl OutboxResetNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages delivered so far.
    pub fn messages(&self) -> Vec<OutboxMessage> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The most recent token sent to `identity`.
    pub fn latest_for(&self, identity: &str) -> Option<String> {
        let identity = cesizen_entity::account::normalize_identity(identity);
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .rev()
            .find(|m| m.identity == identity)
            .map(|m| m.token.clone())
    }
}

#[async_trait]
impl ResetNotifier for OutboxResetNotifier {
    async fn dispatch(&self, account: &Account, token: &IssuedResetToken) -> AppResult<()> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(OutboxMessage {
                account_id: account.id,
                identity: account.identity.clone(),
                token: token.token.clone(),
                expires_at: token.expires_at,
            });
        Ok(())
    }
}
