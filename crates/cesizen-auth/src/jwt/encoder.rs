//! Session token creation.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use uuid::Uuid;

use cesizen_core::Clock;
use cesizen_core::config::AuthConfig;
use cesizen_core::error::AppError;
use cesizen_entity::account::AccountRole;

use super::claims::Claims;

/// A freshly signed session token.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IssuedToken {
    /// Compact JWS.
    pub token: String,
    /// Token ID (`jti`).
    pub token_id: Uuid,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

/// Signs HS256 session tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    ttl: Duration,
    issuer: String,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("ttl", &self.ttl)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.signing_secret.as_bytes()),
            ttl: Duration::minutes(config.token_ttl_minutes as i64),
            issuer: config.token_issuer.clone(),
            clock,
        }
    }

    /// Issues a token for `account_id` valid for the configured TTL.
    pub fn issue(&self, account_id: Uuid, role: AccountRole) -> Result<IssuedToken, AppError> {
        let now = self.clock.now();
        let expires_at = now + self.ttl;

        let claims = Claims {
            sub: account_id,
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode session token: {e}")))?;

        Ok(IssuedToken {
            token,
            token_id: claims.jti,
            expires_at,
        })
    }
}
