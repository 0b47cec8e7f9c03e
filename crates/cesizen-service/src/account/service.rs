//! Registration, login, and self-service operations.

use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};

use cesizen_auth::jwt::{IssuedToken, JwtEncoder};
use cesizen_auth::password::{PasswordHasher, PasswordValidator};
use cesizen_auth::rate_limit::RateLimiter;
use cesizen_core::Clock;
use cesizen_core::error::{AppError, ErrorKind};
use cesizen_core::result::AppResult;
use cesizen_database::CredentialStore;
use cesizen_entity::account::{
    Account, AccountRole, NewAccount, ProfileUpdate, normalize_identity,
};
use cesizen_entity::attempt::{AttemptKey, AttemptOutcome};

use crate::context::RequestContext;
use crate::notify::ResetNotifier;
use crate::retry::RetryPolicy;

/// Shortest identity accepted at registration.
const MIN_IDENTITY_LEN: usize = 3;
/// Longest identity accepted at registration.
const MAX_IDENTITY_LEN: usize = 254;

/// Input to [`AccountService::register`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub identity: String,
    pub secret: String,
    /// Requested role; `None` means `user`.
    pub role: Option<AccountRole>,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: IssuedToken,
    pub account: Account,
}

/// Orchestrates the account lifecycle.
#[derive(Debug, Clone)]
pub struct AccountService {
    pub(crate) store: Arc<dyn CredentialStore>,
    pub(crate) hasher: Arc<PasswordHasher>,
    pub(crate) validator: Arc<PasswordValidator>,
    pub(crate) encoder: Arc<JwtEncoder>,
    pub(crate) limiter: Arc<RateLimiter>,
    pub(crate) notifier: Arc<dyn ResetNotifier>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) retry: RetryPolicy,
    pub(crate) reset_ttl: Duration,
}

impl AccountService {
    /// Creates a new account service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        encoder: Arc<JwtEncoder>,
        limiter: Arc<RateLimiter>,
        notifier: Arc<dyn ResetNotifier>,
        clock: Arc<dyn Clock>,
        retry: RetryPolicy,
        reset_ttl: Duration,
    ) -> Self {
        Self {
            store,
            hasher,
            validator,
            encoder,
            limiter,
            notifier,
            clock,
            retry,
            reset_ttl,
        }
    }

    /// Registers a new account.
    ///
    /// The admin role is never self-assignable. Uniqueness is decided by the
    /// store, so concurrent registrations of one identity yield exactly one
    /// account.
    pub async fn register(&self, req: Registration) -> AppResult<Account> {
        let identity = normalize_identity(&req.identity);
        let length = identity.chars().count();
        if !(MIN_IDENTITY_LEN..=MAX_IDENTITY_LEN).contains(&length) {
            return Err(AppError::validation(format!(
                "Identity must be between {MIN_IDENTITY_LEN} and {MAX_IDENTITY_LEN} characters"
            )));
        }
        if identity.chars().any(char::is_whitespace) {
            return Err(AppError::validation("Identity must not contain whitespace"));
        }

        let role = req.role.unwrap_or(AccountRole::User);
        if !role.is_self_assignable() {
            warn!(identity = %identity, role = %role, "Rejected self-assigned role");
            return Err(AppError::forbidden(format!(
                "Role '{role}' cannot be requested at registration"
            )));
        }

        let email = validate_email(req.email)?;
        let full_name = validate_full_name(req.full_name)?;

        let mut inputs = vec![identity.as_str()];
        if let Some(ref email) = email {
            inputs.push(email.as_str());
        }
        self.validator.validate(&req.secret, &inputs)?;

        let secret_hash = self.hasher.hash_password(&req.secret)?;
        let new_account = NewAccount {
            identity: identity.clone(),
            secret_hash,
            role,
            email,
            full_name,
        };

        let account = self
            .retry
            .run("create_account", || {
                self.store.create_account(new_account.clone())
            })
            .await?;

        info!(
            account_id = %account.id,
            identity = %account.identity,
            role = %account.role,
            "Account registered"
        );
        Ok(account)
    }

    /// Authenticates `identity` with `secret` and issues a session token.
    ///
    /// A locked attempt key is refused before the store is consulted. The
    /// failure that reaches the lockout ceiling is still processed.
    pub async fn login(&self, identity: &str, secret: &str) -> AppResult<LoginOutcome> {
        let identity = normalize_identity(identity);
        let key = AttemptKey::login(identity.as_str());

        self.limiter.check(&key)?;

        let account = match self
            .retry
            .run("find_by_identity", || self.store.find_by_identity(&identity))
            .await
        {
            Ok(account) => account,
            Err(e) if e.kind == ErrorKind::NotFound => {
                self.hasher.verify_decoy(secret);
                self.limiter.check_and_record(&key, AttemptOutcome::Failure)?;
                info!(identity = %identity, reason = "unknown_identity", "Login failed");
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        if !account.can_login() {
            warn!(account_id = %account.id, "Login refused for locked account");
            return Err(AppError::account_locked());
        }

        if !self.hasher.verify_password(secret, &account.secret_hash)? {
            self.limiter.check_and_record(&key, AttemptOutcome::Failure)?;
            info!(account_id = %account.id, reason = "bad_secret", "Login failed");
            return Err(AppError::invalid_credentials());
        }

        self.limiter.check_and_record(&key, AttemptOutcome::Success)?;
        self.rehash_if_needed(&account, secret).await;

        let token = self.encoder.issue(account.id, account.role)?;
        info!(account_id = %account.id, role = %account.role, "Login succeeded");

        Ok(LoginOutcome { token, account })
    }

    /// Upgrades a hash made with outdated parameters. Failures are logged
    /// and never fail the login.
    async fn rehash_if_needed(&self, account: &Account, secret: &str) {
        if !self.hasher.needs_rehash(&account.secret_hash) {
            return;
        }
        let result = match self.hasher.hash_password(secret) {
            Ok(hash) => self.store.update_secret_hash(account.id, &hash).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => info!(account_id = %account.id, "Secret rehashed with current parameters"),
            Err(e) => warn!(account_id = %account.id, error = %e, "Opportunistic rehash failed"),
        }
    }

    /// Returns the caller's own account.
    pub async fn me(&self, ctx: &RequestContext) -> AppResult<Account> {
        self.retry
            .run("find_by_id", || self.store.find_by_id(ctx.account_id))
            .await
    }

    /// Updates the caller's email and display name.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        update: ProfileUpdate,
    ) -> AppResult<Account> {
        let update = ProfileUpdate {
            email: validate_email(update.email)?,
            full_name: validate_full_name(update.full_name)?,
        };

        let account = self
            .retry
            .run("update_profile", || {
                self.store.update_profile(ctx.account_id, &update)
            })
            .await?;

        info!(account_id = %ctx.account_id, "Profile updated");
        Ok(account)
    }

    /// Changes the caller's secret after verifying the current one.
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        current_secret: &str,
        new_secret: &str,
    ) -> AppResult<()> {
        let account = self.me(ctx).await?;

        if !self
            .hasher
            .verify_password(current_secret, &account.secret_hash)?
        {
            return Err(AppError::invalid_credentials());
        }

        let mut inputs = vec![account.identity.as_str()];
        if let Some(ref email) = account.email {
            inputs.push(email.as_str());
        }
        self.validator.validate(new_secret, &inputs)?;
        self.validator
            .validate_not_same(current_secret, new_secret)?;

        let new_hash = self.hasher.hash_password(new_secret)?;
        self.retry
            .run("update_secret_hash", || {
                self.store.update_secret_hash(account.id, &new_hash)
            })
            .await?;

        self.limiter
            .clear(&AttemptKey::login(account.identity.as_str()));
        info!(account_id = %account.id, "Password changed");
        Ok(())
    }
}

/// Normalizes and sanity-checks an optional email address.
pub(crate) fn validate_email(email: Option<String>) -> AppResult<Option<String>> {
    let Some(email) = email else {
        return Ok(None);
    };
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(AppError::validation("Invalid email format"));
    }
    Ok(Some(email))
}

pub(crate) fn validate_full_name(full_name: Option<String>) -> AppResult<Option<String>> {
    match full_name {
        Some(name) if name.trim().is_empty() => {
            Err(AppError::validation("Full name cannot be empty"))
        }
        Some(name) => Ok(Some(name.trim().to_string())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert_eq!(
            validate_email(Some(" Alice@Example.com ".into())).unwrap(),
            Some("alice@example.com".into())
        );
        assert_eq!(validate_email(None).unwrap(), None);
        assert!(validate_email(Some("no-at-sign".into())).is_err());
        assert!(validate_email(Some("@example.com".into())).is_err());
        assert!(validate_email(Some("a@localhost".into())).is_err());
    }
}
