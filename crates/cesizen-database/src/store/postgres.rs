//! PostgreSQL credential store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use cesizen_core::error::{AppError, ErrorKind};
use cesizen_core::result::AppResult;
use cesizen_entity::account::{
    Account, AccountRole, AccountStatus, NewAccount, ProfileUpdate, normalize_email,
    normalize_identity,
};
use cesizen_entity::reset_token::{IssuedResetToken, ResetToken, ResetTokenState};

use super::CredentialStore;
use super::token::{generate_reset_token, hash_reset_token};

const IDENTITY_CONSTRAINT: &str = "accounts_identity_key";
const EMAIL_CONSTRAINT: &str = "accounts_email_key";

/// Map a sqlx error, classifying connectivity failures as transient.
pub(crate) fn map_sqlx_error(context: &str, err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => {
            AppError::with_source(ErrorKind::Unavailable, format!("{context}: store unreachable"), err)
        }
        _ => AppError::with_source(ErrorKind::Database, context.to_string(), err),
    }
}

/// Map a write error, translating unique violations into domain conflicts.
fn map_write_error(context: &str, identity: &str, err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(IDENTITY_CONSTRAINT) => {
            AppError::duplicate_identity(identity)
        }
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(EMAIL_CONSTRAINT) => {
            AppError::duplicate_email()
        }
        _ => map_sqlx_error(context, err),
    }
}

/// Credential store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Create a store on an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Explain why a conditional consume matched no row.
    async fn unusable_token_error(&self, token_hash: &str, now: DateTime<Utc>) -> AppError {
        let existing =
            sqlx::query_as::<_, ResetToken>("SELECT * FROM reset_tokens WHERE token_hash = $1")
                .bind(token_hash)
                .fetch_optional(&self.pool)
                .await;

        match existing {
            Err(e) => map_sqlx_error("Failed to look up reset token", e),
            Ok(None) => AppError::new(ErrorKind::InvalidResetToken, "Unknown reset token"),
            Ok(Some(t)) => match t.state_at(now) {
                ResetTokenState::Expired => {
                    AppError::new(ErrorKind::ExpiredResetToken, "Reset token expired")
                }
                // A usable row here means a concurrent caller won the update.
                ResetTokenState::Consumed | ResetTokenState::Usable => {
                    AppError::new(ErrorKind::ResetTokenConsumed, "Reset token already used")
                }
            },
        }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL pool closed");
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| map_sqlx_error("Health check failed", e))
    }

    async fn create_account(&self, data: NewAccount) -> AppResult<Account> {
        let identity = normalize_identity(&data.identity);
        let email = data.email.as_deref().map(normalize_email);

        sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (id, identity, email, full_name, secret_hash, role) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&identity)
        .bind(&email)
        .bind(&data.full_name)
        .bind(&data.secret_hash)
        .bind(data.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error("Failed to create account", &identity, e))
    }

    async fn find_by_identity(&self, identity: &str) -> AppResult<Account> {
        let identity = normalize_identity(identity);
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE identity = $1")
            .bind(&identity)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to find account by identity", e))?
            .ok_or_else(|| AppError::not_found(format!("Account '{identity}' not found")))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Account> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to find account by id", e))?
            .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }

    async fn list_accounts(&self, skip: u64, limit: u64) -> AppResult<Vec<Account>> {
        sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit as i64)
        .bind(skip as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to list accounts", e))
    }

    async fn update_role(&self, id: Uuid, role: AccountRole) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "UPDATE accounts SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to update role", e))?
        .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }

    async fn set_status(&self, id: Uuid, status: AccountStatus) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "UPDATE accounts SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to update status", e))?
        .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }

    async fn update_secret_hash(&self, id: Uuid, secret_hash: &str) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE accounts SET secret_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(secret_hash)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("Failed to update secret", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Account {id} not found")));
        }
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> AppResult<Account> {
        let email = update.email.as_deref().map(normalize_email);
        sqlx::query_as::<_, Account>(
            "UPDATE accounts SET email = COALESCE($2, email), \
                                 full_name = COALESCE($3, full_name), \
                                 updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&email)
        .bind(&update.full_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error("Failed to update profile", "", e))?
        .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }

    async fn delete_account(&self, id: Uuid) -> AppResult<()> {
        // reset_tokens rows go with the account via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to delete account", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Account {id} not found")));
        }
        Ok(())
    }

    async fn issue_reset_token(
        &self,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<IssuedResetToken> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("Failed to begin transaction", e))?;

        // Serializes concurrent issuance for the same account.
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM accounts WHERE id = $1 FOR UPDATE")
                .bind(account_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("Failed to lock account", e))?;
        if locked.is_none() {
            return Err(AppError::not_found(format!("Account {account_id} not found")));
        }

        let superseded =
            sqlx::query("DELETE FROM reset_tokens WHERE account_id = $1 AND NOT consumed")
                .bind(account_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("Failed to invalidate reset tokens", e))?
                .rows_affected();

        let token = generate_reset_token();
        sqlx::query(
            "INSERT INTO reset_tokens (token_hash, account_id, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(hash_reset_token(&token))
        .bind(account_id)
        .bind(expires_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to store reset token", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit reset token", e))?;

        debug!(account_id = %account_id, superseded, "Reset token issued");
        Ok(IssuedResetToken {
            token,
            account_id,
            expires_at,
        })
    }

    async fn consume_reset_token(&self, token: &str, now: DateTime<Utc>) -> AppResult<Uuid> {
        let token_hash = hash_reset_token(token);

        let consumed: Option<Uuid> = sqlx::query_scalar(
            "UPDATE reset_tokens SET consumed = TRUE, consumed_at = $2 \
             WHERE token_hash = $1 AND NOT consumed AND expires_at > $2 \
             RETURNING account_id",
        )
        .bind(&token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to consume reset token", e))?;

        match consumed {
            Some(account_id) => Ok(account_id),
            None => Err(self.unusable_token_error(&token_hash, now).await),
        }
    }

    async fn redeem_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
        secret_hash: &str,
    ) -> AppResult<Account> {
        let token_hash = hash_reset_token(token);
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("Failed to begin transaction", e))?;

        let consumed: Option<Uuid> = sqlx::query_scalar(
            "UPDATE reset_tokens SET consumed = TRUE, consumed_at = $2 \
             WHERE token_hash = $1 AND NOT consumed AND expires_at > $2 \
             RETURNING account_id",
        )
        .bind(&token_hash)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to consume reset token", e))?;

        let Some(account_id) = consumed else {
            drop(tx);
            return Err(self.unusable_token_error(&token_hash, now).await);
        };

        let account = sqlx::query_as::<_, Account>(
            "UPDATE accounts SET secret_hash = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(account_id)
        .bind(secret_hash)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to update secret", e))?
        .ok_or_else(|| AppError::not_found(format!("Account {account_id} not found")))?;

        // Dropping the transaction on any error above rolls the consumption back.
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit password reset", e))?;
        Ok(account)
    }

    async fn purge_expired_reset_tokens(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM reset_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to purge reset tokens", e))?;
        Ok(result.rows_affected())
    }
}
