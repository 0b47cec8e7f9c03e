//! Wiring of every service from one configuration.

use std::sync::Arc;
use std::time::Duration;

use cesizen_auth::jwt::{JwtDecoder, JwtEncoder};
use cesizen_auth::password::{PasswordHasher, PasswordValidator};
use cesizen_auth::rate_limit::RateLimiter;
use cesizen_auth::Authorizer;
use cesizen_core::Clock;
use cesizen_core::config::AppConfig;
use cesizen_core::result::AppResult;
use cesizen_database::CredentialStore;

use crate::account::{AccountService, AdminAccountService};
use crate::housekeeping::Housekeeper;
use crate::notify::ResetNotifier;
use crate::retry::RetryPolicy;

/// Every long-lived component, built once at startup.
#[derive(Debug, Clone)]
pub struct Services {
    pub store: Arc<dyn CredentialStore>,
    pub accounts: Arc<AccountService>,
    pub admin: Arc<AdminAccountService>,
    pub authorizer: Arc<Authorizer>,
    pub limiter: Arc<RateLimiter>,
    pub housekeeper: Housekeeper,
}

impl Services {
    /// Builds the services on `store`. The configuration is read here and
    /// nowhere else.
    pub fn build(
        config: &AppConfig,
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn ResetNotifier>,
    ) -> AppResult<Self> {
        let hasher = Arc::new(PasswordHasher::new(&config.auth)?);
        let validator = Arc::new(PasswordValidator::new(&config.auth));
        let encoder = Arc::new(JwtEncoder::new(&config.auth, Arc::clone(&clock)));
        let decoder = Arc::new(JwtDecoder::new(&config.auth, Arc::clone(&clock)));
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit, Arc::clone(&clock)));
        let retry = RetryPolicy::from_config(&config.store);

        let accounts = Arc::new(AccountService::new(
            Arc::clone(&store),
            hasher,
            validator,
            encoder,
            Arc::clone(&limiter),
            notifier,
            Arc::clone(&clock),
            retry,
            chrono::Duration::minutes(config.auth.reset_token_ttl_minutes as i64),
        ));
        let admin = Arc::new(AdminAccountService::new(
            Arc::clone(&store),
            Arc::clone(&limiter),
            retry,
        ));
        let housekeeper = Housekeeper::new(
            Arc::clone(&store),
            Arc::clone(&limiter),
            clock,
            Duration::from_secs(config.rate_limit.sweep_interval_seconds),
        );

        Ok(Self {
            store,
            accounts,
            admin,
            authorizer: Arc::new(Authorizer::new(decoder)),
            limiter,
            housekeeper,
        })
    }
}
