//! Password reset: request and confirmation.

use tracing::{debug, error, info, warn};

use cesizen_core::error::ErrorKind;
use cesizen_core::result::AppResult;
use cesizen_entity::account::normalize_identity;
use cesizen_entity::attempt::{AttemptKey, AttemptOutcome};

use super::service::AccountService;

impl AccountService {
    /// Starts a password reset for `identity`.
    ///
    /// Succeeds identically whether or not the identity exists; a token is
    /// issued and dispatched only for an existing account. Issuing
    /// supersedes any token the account already holds.
    pub async fn request_password_reset(&self, identity: &str) -> AppResult<()> {
        let identity = normalize_identity(identity);

        let account = match self
            .retry
            .run("find_by_identity", || self.store.find_by_identity(&identity))
            .await
        {
            Ok(account) => account,
            Err(e) if e.kind == ErrorKind::NotFound => {
                debug!(identity = %identity, "Password reset requested for unknown identity");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let expires_at = self.clock.now() + self.reset_ttl;
        let issued = self
            .retry
            .run("issue_reset_token", || {
                self.store.issue_reset_token(account.id, expires_at)
            })
            .await?;

        if let Err(e) = self.notifier.dispatch(&account, &issued).await {
            error!(account_id = %account.id, error = %e, "Failed to dispatch reset token");
        }

        info!(account_id = %account.id, expires_at = %expires_at, "Password reset requested");
        Ok(())
    }

    /// Completes a reset: consumes `token` and replaces the account secret.
    ///
    /// Failed confirmations count against `(reset_confirm, source)`. A
    /// successful reset also lifts any login lockout on the account.
    pub async fn confirm_password_reset(
        &self,
        token: &str,
        new_secret: &str,
        source: &str,
    ) -> AppResult<()> {
        let key = AttemptKey::reset_confirm(source);
        self.limiter.check(&key)?;

        // Checked before consuming so a rejected secret keeps the token usable.
        self.validator.validate(new_secret, &[])?;

        // Hashed up front so the token is only spent together with the write.
        let new_hash = self.hasher.hash_password(new_secret)?;

        let now = self.clock.now();
        let account = match self
            .retry
            .run("redeem_reset_token", || {
                self.store.redeem_reset_token(token, now, &new_hash)
            })
            .await
        {
            Ok(account) => account,
            Err(e) if e.kind.is_reset_failure() => {
                warn!(source = %source, reason = %e.kind, "Password reset confirmation failed");
                self.limiter.check_and_record(&key, AttemptOutcome::Failure)?;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        self.limiter.clear(&key);
        self.limiter
            .clear(&AttemptKey::login(account.identity.as_str()));

        info!(account_id = %account.id, "Password reset completed");
        Ok(())
    }
}
