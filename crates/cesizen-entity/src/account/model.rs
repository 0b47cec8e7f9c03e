//! Account entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::AccountRole;
use super::status::AccountStatus;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    /// Unique account identifier.
    pub id: Uuid,
    /// Unique, case-folded identity (username or email).
    pub identity: String,
    /// Contact email, case-folded. Unique when present.
    pub email: Option<String>,
    /// Human-readable name.
    pub full_name: Option<String>,
    /// Self-describing Argon2id hash of the account secret.
    #[serde(skip_serializing, default)]
    pub secret_hash: String,
    /// Account role.
    pub role: AccountRole,
    /// Account status.
    pub status: AccountStatus,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Check if this account can log in right now.
    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }
}

/// Data required to create a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Desired identity; normalized by the store.
    pub identity: String,
    /// Pre-hashed secret.
    pub secret_hash: String,
    /// Assigned role.
    pub role: AccountRole,
    /// Optional email; normalized by the store.
    pub email: Option<String>,
    /// Optional display name.
    pub full_name: Option<String>,
}

/// Profile fields an account holder may change. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New email address.
    pub email: Option<String>,
    /// New display name.
    pub full_name: Option<String>,
}

/// Canonical form of an identity: trimmed and lowercased.
pub fn normalize_identity(identity: &str) -> String {
    identity.trim().to_lowercase()
}

/// Canonical form of an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
