//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cesizen_auth::Principal;
use cesizen_entity::account::{Account, AccountRole, AccountStatus};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Account as returned to callers. Never carries the secret hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub identity: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: AccountRole,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            identity: account.identity,
            email: account.email,
            full_name: account.full_name,
            role: account.role,
            status: account.status,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Session token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
    /// Session token expiration.
    pub expires_at: DateTime<Utc>,
    pub account: AccountResponse,
}

/// Resolved bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub account_id: Uuid,
    pub role: AccountRole,
    pub expires_at: DateTime<Utc>,
}

impl From<Principal> for VerifyResponse {
    fn from(principal: Principal) -> Self {
        Self {
            account_id: principal.account_id,
            role: principal.role,
            expires_at: principal.expires_at,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `unhealthy`.
    pub status: String,
    /// `connected` or `disconnected`.
    pub store: String,
    /// Store backend name.
    pub backend: String,
    pub version: String,
}
