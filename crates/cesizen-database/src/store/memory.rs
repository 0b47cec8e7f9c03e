//! In-process credential store.
//!
//! All state sits behind one `tokio::sync::RwLock`; every trait operation
//! takes the lock once, so each check-and-write is atomic with respect to
//! concurrent callers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
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

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<Uuid, Account>,
    by_identity: HashMap<String, Uuid>,
    by_email: HashMap<String, Uuid>,
    /// Keyed by token digest.
    reset_tokens: HashMap<String, ResetToken>,
}

impl Inner {
    /// The owner of a usable token, without consuming it.
    fn usable_token(&self, digest: &str, now: DateTime<Utc>) -> AppResult<Uuid> {
        let record = self
            .reset_tokens
            .get(digest)
            .ok_or_else(|| AppError::new(ErrorKind::InvalidResetToken, "Unknown reset token"))?;

        match record.state_at(now) {
            ResetTokenState::Consumed => Err(AppError::new(
                ErrorKind::ResetTokenConsumed,
                "Reset token already used",
            )),
            ResetTokenState::Expired => Err(AppError::new(
                ErrorKind::ExpiredResetToken,
                "Reset token expired",
            )),
            ResetTokenState::Usable => Ok(record.account_id),
        }
    }

    fn mark_consumed(&mut self, digest: &str, now: DateTime<Utc>) {
        if let Some(record) = self.reset_tokens.get_mut(digest) {
            record.consumed = true;
            record.consumed_at = Some(now);
        }
    }

    fn account_mut(&mut self, id: Uuid) -> AppResult<&mut Account> {
        self.accounts
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }
}

/// Credential store held entirely in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn create_account(&self, data: NewAccount) -> AppResult<Account> {
        let identity = normalize_identity(&data.identity);
        let email = data.email.as_deref().map(normalize_email);

        let mut inner = self.inner.write().await;
        if inner.by_identity.contains_key(&identity) {
            return Err(AppError::duplicate_identity(&identity));
        }
        if let Some(ref email) = email {
            if inner.by_email.contains_key(email) {
                return Err(AppError::duplicate_email());
            }
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::now_v7(),
            identity: identity.clone(),
            email: email.clone(),
            full_name: data.full_name,
            secret_hash: data.secret_hash,
            role: data.role,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        };

        inner.by_identity.insert(identity, account.id);
        if let Some(email) = email {
            inner.by_email.insert(email, account.id);
        }
        inner.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_identity(&self, identity: &str) -> AppResult<Account> {
        let identity = normalize_identity(identity);
        let inner = self.inner.read().await;
        inner
            .by_identity
            .get(&identity)
            .and_then(|id| inner.accounts.get(id))
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Account '{identity}' not found")))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Account> {
        self.inner
            .read()
            .await
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }

    async fn list_accounts(&self, skip: u64, limit: u64) -> AppResult<Vec<Account>> {
        let inner = self.inner.read().await;
        let mut accounts: Vec<Account> = inner.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(accounts
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn update_role(&self, id: Uuid, role: AccountRole) -> AppResult<Account> {
        let mut inner = self.inner.write().await;
        let account = inner.account_mut(id)?;
        account.role = role;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn set_status(&self, id: Uuid, status: AccountStatus) -> AppResult<Account> {
        let mut inner = self.inner.write().await;
        let account = inner.account_mut(id)?;
        account.status = status;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn update_secret_hash(&self, id: Uuid, secret_hash: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let account = inner.account_mut(id)?;
        account.secret_hash = secret_hash.to_string();
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> AppResult<Account> {
        let mut inner = self.inner.write().await;
        let current_email = inner.account_mut(id)?.email.clone();

        let new_email = update.email.as_deref().map(normalize_email);
        if let Some(ref email) = new_email {
            if current_email.as_ref() != Some(email) {
                if inner.by_email.contains_key(email) {
                    return Err(AppError::duplicate_email());
                }
                if let Some(old) = current_email {
                    inner.by_email.remove(&old);
                }
                inner.by_email.insert(email.clone(), id);
            }
        }

        let account = inner.account_mut(id)?;
        if let Some(email) = new_email {
            account.email = Some(email);
        }
        if let Some(ref full_name) = update.full_name {
            account.full_name = Some(full_name.clone());
        }
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn delete_account(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let account = inner
            .accounts
            .remove(&id)
            .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))?;
        inner.by_identity.remove(&account.identity);
        if let Some(email) = account.email {
            inner.by_email.remove(&email);
        }
        inner.reset_tokens.retain(|_, t| t.account_id != id);
        Ok(())
    }

    async fn issue_reset_token(
        &self,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<IssuedResetToken> {
        let mut inner = self.inner.write().await;
        if !inner.accounts.contains_key(&account_id) {
            return Err(AppError::not_found(format!("Account {account_id} not found")));
        }

        let before = inner.reset_tokens.len();
        inner
            .reset_tokens
            .retain(|_, t| t.account_id != account_id || t.consumed);
        let superseded = before - inner.reset_tokens.len();

        let token = generate_reset_token();
        inner.reset_tokens.insert(
            hash_reset_token(&token),
            ResetToken {
                token_hash: hash_reset_token(&token),
                account_id,
                expires_at,
                consumed: false,
                consumed_at: None,
                created_at: Utc::now(),
            },
        );

        debug!(account_id = %account_id, superseded, "Reset token issued");
        Ok(IssuedResetToken {
            token,
            account_id,
            expires_at,
        })
    }

    async fn consume_reset_token(&self, token: &str, now: DateTime<Utc>) -> AppResult<Uuid> {
        let digest = hash_reset_token(token);
        let mut inner = self.inner.write().await;
        let account_id = inner.usable_token(&digest, now)?;
        inner.mark_consumed(&digest, now);
        Ok(account_id)
    }

    async fn redeem_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
        secret_hash: &str,
    ) -> AppResult<Account> {
        let digest = hash_reset_token(token);
        let mut inner = self.inner.write().await;
        let account_id = inner.usable_token(&digest, now)?;

        let account = inner.account_mut(account_id)?;
        account.secret_hash = secret_hash.to_string();
        account.updated_at = Utc::now();
        let account = account.clone();

        inner.mark_consumed(&digest, now);
        Ok(account)
    }

    async fn purge_expired_reset_tokens(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.reset_tokens.len();
        inner.reset_tokens.retain(|_, t| t.expires_at > now);
        Ok((before - inner.reset_tokens.len()) as u64)
    }
}
