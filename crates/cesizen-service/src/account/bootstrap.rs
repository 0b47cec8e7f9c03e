//! Idempotent creation of the configured administrator.

use tracing::{info, warn};

use cesizen_core::config::AdminConfig;
use cesizen_core::error::{AppError, ErrorKind};
use cesizen_core::result::AppResult;
use cesizen_entity::account::{AccountRole, NewAccount, normalize_identity};

use super::service::AccountService;

/// What [`AccountService::bootstrap_admin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The admin account was created by this call.
    Created,
    /// An account with the admin identity already existed and was left as is.
    AlreadyPresent,
}

impl AccountService {
    /// Ensures an account with the configured admin identity exists.
    ///
    /// An existing account is never modified, so an operator-changed secret
    /// survives restarts. A concurrent creation by another instance counts
    /// as success.
    pub async fn bootstrap_admin(&self, admin: &AdminConfig) -> AppResult<BootstrapOutcome> {
        let identity = normalize_identity(&admin.identity);
        if identity.is_empty() || admin.secret.is_empty() {
            return Err(AppError::configuration(
                "Admin identity and secret must be configured",
            ));
        }

        match self
            .retry
            .run("find_by_identity", || self.store.find_by_identity(&identity))
            .await
        {
            Ok(existing) => {
                if !existing.role.is_admin() {
                    warn!(
                        account_id = %existing.id,
                        role = %existing.role,
                        "Configured admin identity exists without the admin role; leaving it untouched"
                    );
                }
                info!(account_id = %existing.id, "Admin account already present");
                return Ok(BootstrapOutcome::AlreadyPresent);
            }
            Err(e) if e.kind == ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        let new_account = NewAccount {
            identity: identity.clone(),
            secret_hash: self.hasher.hash_password(&admin.secret)?,
            role: AccountRole::Admin,
            email: admin.email.clone(),
            full_name: Some("Administrator".to_string()),
        };

        match self
            .retry
            .run("create_account", || {
                self.store.create_account(new_account.clone())
            })
            .await
        {
            Ok(account) => {
                info!(account_id = %account.id, identity = %account.identity, "Admin account created");
                Ok(BootstrapOutcome::Created)
            }
            Err(e) if e.kind == ErrorKind::DuplicateIdentity => {
                info!(identity = %identity, "Admin account created concurrently");
                Ok(BootstrapOutcome::AlreadyPresent)
            }
            Err(e) => Err(e),
        }
    }
}
