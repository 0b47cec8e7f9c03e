//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use cesizen_auth::Authorizer;
use cesizen_core::config::AppConfig;
use cesizen_database::CredentialStore;
use cesizen_service::{AccountService, AdminAccountService, Services};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Credential store (in-memory or PostgreSQL)
    pub store: Arc<dyn CredentialStore>,

    // ── Auth ─────────────────────────────────────────────────
    /// Bearer token resolution and role checks
    pub authorizer: Arc<Authorizer>,

    // ── Services ─────────────────────────────────────────────
    /// Registration, login, reset and self-service
    pub accounts: Arc<AccountService>,
    /// Administrative account management
    pub admin: Arc<AdminAccountService>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, services: &Services) -> Self {
        Self {
            config,
            store: Arc::clone(&services.store),
            authorizer: Arc::clone(&services.authorizer),
            accounts: Arc::clone(&services.accounts),
            admin: Arc::clone(&services.admin),
        }
    }
}
