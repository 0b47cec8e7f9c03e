//! Administrative account management: listing, lookup, role and status
//! changes, and deletion.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use cesizen_auth::rate_limit::RateLimiter;
use cesizen_auth::rbac::RbacEnforcer;
use cesizen_core::error::AppError;
use cesizen_core::result::AppResult;
use cesizen_database::CredentialStore;
use cesizen_entity::account::{Account, AccountRole, AccountStatus, ProfileUpdate};
use cesizen_entity::attempt::AttemptKey;

use super::service::{validate_email, validate_full_name};
use crate::context::RequestContext;
use crate::retry::RetryPolicy;

/// Largest page returned by [`AdminAccountService::list_accounts`].
pub const MAX_PAGE_SIZE: u64 = 100;

/// Handles administrative account operations. Every method requires an
/// admin caller.
#[derive(Debug, Clone)]
pub struct AdminAccountService {
    store: Arc<dyn CredentialStore>,
    limiter: Arc<RateLimiter>,
    rbac: RbacEnforcer,
    retry: RetryPolicy,
}

impl AdminAccountService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        limiter: Arc<RateLimiter>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            limiter,
            rbac: RbacEnforcer::new(),
            retry,
        }
    }

    /// Lists accounts in creation order; `limit` is clamped to `1..=100`.
    pub async fn list_accounts(
        &self,
        ctx: &RequestContext,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<Account>> {
        self.rbac.require_admin(ctx.role)?;
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        self.retry
            .run("list_accounts", || self.store.list_accounts(skip, limit))
            .await
    }

    pub async fn get_account(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Account> {
        self.rbac.require_admin(ctx.role)?;
        self.retry
            .run("find_by_id", || self.store.find_by_id(id))
            .await
    }

    pub async fn get_by_identity(
        &self,
        ctx: &RequestContext,
        identity: &str,
    ) -> AppResult<Account> {
        self.rbac.require_admin(ctx.role)?;
        self.retry
            .run("find_by_identity", || self.store.find_by_identity(identity))
            .await
    }

    /// Edits the target account's email and display name.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        target: Uuid,
        update: ProfileUpdate,
    ) -> AppResult<Account> {
        self.rbac.require_admin(ctx.role)?;
        let update = ProfileUpdate {
            email: validate_email(update.email)?,
            full_name: validate_full_name(update.full_name)?,
        };

        let account = self
            .retry
            .run("update_profile", || self.store.update_profile(target, &update))
            .await?;

        info!(admin_id = %ctx.account_id, account_id = %target, "Account profile updated");
        Ok(account)
    }

    /// Assigns `role` to the target account. Tokens already issued keep the
    /// role they were minted with until they expire.
    pub async fn change_role(
        &self,
        ctx: &RequestContext,
        target: Uuid,
        role: AccountRole,
    ) -> AppResult<Account> {
        self.rbac.require_admin(ctx.role)?;
        let account = self
            .retry
            .run("update_role", || self.store.update_role(target, role))
            .await?;

        info!(
            admin_id = %ctx.account_id,
            account_id = %target,
            role = %role,
            "Account role changed"
        );
        Ok(account)
    }

    /// Locks or unlocks the target account. Unlocking also lifts any login
    /// rate-limit lockout.
    pub async fn set_status(
        &self,
        ctx: &RequestContext,
        target: Uuid,
        status: AccountStatus,
    ) -> AppResult<Account> {
        self.rbac.require_admin(ctx.role)?;
        if target == ctx.account_id && status == AccountStatus::Locked {
            return Err(AppError::validation("Administrators cannot lock their own account"));
        }

        let account = self
            .retry
            .run("set_status", || self.store.set_status(target, status))
            .await?;

        if status == AccountStatus::Active {
            self.limiter
                .clear(&AttemptKey::login(account.identity.as_str()));
        }

        info!(
            admin_id = %ctx.account_id,
            account_id = %target,
            status = %status,
            "Account status changed"
        );
        Ok(account)
    }

    /// Deletes the target account and its reset tokens.
    pub async fn delete_account(&self, ctx: &RequestContext, target: Uuid) -> AppResult<()> {
        self.rbac.require_admin(ctx.role)?;
        if target == ctx.account_id {
            return Err(AppError::validation("Administrators cannot delete their own account"));
        }

        self.retry
            .run("delete_account", || self.store.delete_account(target))
            .await?;

        info!(admin_id = %ctx.account_id, account_id = %target, "Account deleted");
        Ok(())
    }
}
