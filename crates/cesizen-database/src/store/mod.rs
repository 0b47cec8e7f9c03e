//! Credential store contract and backend selection.

pub mod memory;
pub mod postgres;
pub mod token;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use cesizen_core::config::StoreConfig;
use cesizen_core::error::AppError;
use cesizen_core::result::AppResult;
use cesizen_entity::account::{Account, AccountRole, AccountStatus, NewAccount, ProfileUpdate};
use cesizen_entity::reset_token::IssuedResetToken;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

/// Persistence for accounts and password-reset tokens.
///
/// Every write is durable when the call returns. Identity and email
/// uniqueness, and the single outstanding reset token per account, are
/// enforced here atomically rather than by callers.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// Backend name for diagnostics ("memory", "postgres").
    fn backend(&self) -> &'static str;

    /// Check that the store is reachable.
    async fn ping(&self) -> AppResult<()>;

    /// Release backend resources on shutdown.
    async fn close(&self) {}

    /// Insert an account. Fails `DuplicateIdentity` or `DuplicateEmail`.
    async fn create_account(&self, data: NewAccount) -> AppResult<Account>;

    /// Look an account up by identity (case-insensitive). Fails `NotFound`.
    async fn find_by_identity(&self, identity: &str) -> AppResult<Account>;

    /// Look an account up by id. Fails `NotFound`.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Account>;

    /// Accounts in creation order.
    async fn list_accounts(&self, skip: u64, limit: u64) -> AppResult<Vec<Account>>;

    async fn update_role(&self, id: Uuid, role: AccountRole) -> AppResult<Account>;

    async fn set_status(&self, id: Uuid, status: AccountStatus) -> AppResult<Account>;

    async fn update_secret_hash(&self, id: Uuid, secret_hash: &str) -> AppResult<()>;

    /// Apply the `Some` fields of `update`. Fails `DuplicateEmail`.
    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> AppResult<Account>;

    /// Remove an account together with its reset tokens.
    async fn delete_account(&self, id: Uuid) -> AppResult<()>;

    /// Issue a new reset token, invalidating every unconsumed token the
    /// account already holds in the same atomic step.
    async fn issue_reset_token(
        &self,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<IssuedResetToken>;

    /// Mark a raw token consumed and return its account.
    ///
    /// Fails `InvalidResetToken` (unknown or superseded),
    /// `ExpiredResetToken` or `ResetTokenConsumed`.
    async fn consume_reset_token(&self, token: &str, now: DateTime<Utc>) -> AppResult<Uuid>;

    /// Consume a raw token and replace its account's secret hash in one
    /// atomic step. Either both happen or neither does, so a failed write
    /// leaves the token usable. Fails like [`Self::consume_reset_token`].
    async fn redeem_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
        secret_hash: &str,
    ) -> AppResult<Account>;

    /// Drop tokens whose expiry has passed. Returns the number removed.
    async fn purge_expired_reset_tokens(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Open the store selected by `config.connection_target`.
///
/// `memory://` selects the in-process store; `postgres://` and
/// `postgresql://` open a pool and run pending migrations.
pub async fn open_store(config: &StoreConfig) -> AppResult<Arc<dyn CredentialStore>> {
    let target = config.connection_target.as_str();
    if config.is_memory() {
        info!("Initializing in-memory credential store");
        return Ok(Arc::new(MemoryCredentialStore::new()));
    }
    if target.starts_with("postgres://") || target.starts_with("postgresql://") {
        let pool = crate::connection::DatabasePool::connect(config).await?;
        crate::migration::run_migrations(pool.pool()).await?;
        return Ok(Arc::new(PgCredentialStore::new(pool.pool().clone())));
    }
    Err(AppError::configuration(format!(
        "Unsupported store target '{}'. Supported: memory://, postgres://",
        crate::connection::mask_password(target)
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_store() {
        let config = StoreConfig {
            connection_target: "memory://".into(),
            ..StoreConfig::default()
        };
        let store = open_store(&config).await.unwrap();
        assert_eq!(store.backend(), "memory");
        store.ping().await.unwrap();

        // Closing the in-process store releases nothing and keeps it usable.
        store.close().await;
        store.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_scheme_is_configuration_error() {
        let config = StoreConfig {
            connection_target: "mongodb://localhost/cesizen".into(),
            ..StoreConfig::default()
        };
        let err = open_store(&config).await.unwrap_err();
        assert_eq!(err.kind, cesizen_core::ErrorKind::Configuration);
    }
}
