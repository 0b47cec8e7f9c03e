//! Session token verification.
//!
//! Verification is a pure computation: signature check, issuer check and a
//! clock comparison. No shared mutable state is touched.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use cesizen_core::Clock;
use cesizen_core::config::AuthConfig;
use cesizen_core::error::{AppError, ErrorKind};

use super::claims::Claims;

/// Verifies HS256 session tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
    leeway_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against the injected clock in `verify`.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.set_issuer(&[config.token_issuer.as_str()]);

        Self {
            decoding_key: DecodingKey::from_secret(config.signing_secret.as_bytes()),
            validation,
            leeway_seconds: config.token_leeway_seconds as i64,
            clock,
        }
    }

    /// Verifies `token` and returns its claims.
    ///
    /// Fails with `MalformedToken`, `BadSignature`, `AlgorithmMismatch` or
    /// `TokenExpired`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                JwtErrorKind::InvalidSignature => {
                    AppError::new(ErrorKind::BadSignature, "Token signature does not verify")
                }
                JwtErrorKind::InvalidAlgorithm => AppError::new(
                    ErrorKind::AlgorithmMismatch,
                    "Token was not signed with HS256",
                ),
                JwtErrorKind::InvalidIssuer => {
                    AppError::new(ErrorKind::MalformedToken, "Token issuer is not accepted")
                }
                _ => AppError::new(
                    ErrorKind::MalformedToken,
                    format!("Token could not be parsed: {e}"),
                ),
            }
        })?;

        let claims = data.claims;
        if self.clock.now().timestamp() >= claims.exp + self.leeway_seconds {
            return Err(AppError::new(ErrorKind::TokenExpired, "Token has expired"));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtEncoder;
    use cesizen_core::ManualClock;
    use cesizen_entity::account::AccountRole;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            signing_secret: secret.to_string(),
            ..AuthConfig::default()
        }
    }

    const SECRET: &str = "test-signing-secret-0123456789abcdef";

    fn pair(clock: &ManualClock) -> (JwtEncoder, JwtDecoder) {
        let cfg = config(SECRET);
        let clock: Arc<dyn Clock> = Arc::new(clock.clone());
        (
            JwtEncoder::new(&cfg, Arc::clone(&clock)),
            JwtDecoder::new(&cfg, clock),
        )
    }

    #[test]
    fn test_issue_then_verify() {
        let clock = ManualClock::starting_now();
        let (encoder, decoder) = pair(&clock);
        let account_id = Uuid::new_v4();

        let issued = encoder.issue(account_id, AccountRole::User).unwrap();
        let claims = decoder.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, account_id);
        assert_eq!(claims.role, AccountRole::User);
        assert_eq!(claims.jti, issued.token_id);
    }

    #[test]
    fn test_expired_at_ttl_boundary() {
        let clock = ManualClock::starting_now();
        let (encoder, decoder) = pair(&clock);
        let issued = encoder.issue(Uuid::new_v4(), AccountRole::Admin).unwrap();

        clock.advance(Duration::minutes(29));
        assert!(decoder.verify(&issued.token).is_ok());

        clock.advance(Duration::minutes(1));
        let err = decoder.verify(&issued.token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenExpired);
    }

    #[test]
    fn test_other_secret_is_bad_signature() {
        let clock = ManualClock::starting_now();
        let (_, decoder) = pair(&clock);
        let foreign = JwtEncoder::new(
            &config("another-secret-that-is-long-enough-xyz"),
            Arc::new(clock.clone()),
        );
        let issued = foreign.issue(Uuid::new_v4(), AccountRole::Admin).unwrap();

        let err = decoder.verify(&issued.token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadSignature);
    }

    #[test]
    fn test_tampered_payload_is_bad_signature() {
        let clock = ManualClock::starting_now();
        let (encoder, decoder) = pair(&clock);
        let user = encoder.issue(Uuid::new_v4(), AccountRole::User).unwrap();
        let admin = encoder.issue(Uuid::new_v4(), AccountRole::Admin).unwrap();

        // Graft the admin payload onto the user's signature.
        let u: Vec<&str> = user.token.split('.').collect();
        let a: Vec<&str> = admin.token.split('.').collect();
        let forged = format!("{}.{}.{}", u[0], a[1], u[2]);

        let err = decoder.verify(&forged).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadSignature);
    }

    #[test]
    fn test_hs512_is_algorithm_mismatch() {
        let clock = ManualClock::starting_now();
        let (_, decoder) = pair(&clock);
        let now = clock.now();
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: AccountRole::Admin,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(30)).timestamp(),
            jti: Uuid::new_v4(),
            iss: AuthConfig::default().token_issuer,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = decoder.verify(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlgorithmMismatch);
    }

    #[test]
    fn test_garbage_is_malformed() {
        let clock = ManualClock::starting_now();
        let (_, decoder) = pair(&clock);
        for token in ["", "not-a-token", "a.b.c"] {
            let err = decoder.verify(token).unwrap_err();
            assert_eq!(err.kind, ErrorKind::MalformedToken, "token {token:?}");
        }
    }
}
