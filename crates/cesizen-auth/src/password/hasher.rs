//! Argon2id password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use cesizen_core::config::AuthConfig;
use cesizen_core::error::AppError;

/// Hashes and verifies secrets with Argon2id.
///
/// Output is a PHC string carrying algorithm, parameters and salt, so a
/// stored hash stays verifiable after the configured parameters change.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash of a random secret, verified against when no account matches so
    /// that unknown identities cost the same as wrong secrets.
    decoy_hash: String,
}

impl PasswordHasher {
    /// Creates a hasher using the configured Argon2 cost parameters.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;

        let mut hasher = Self {
            params,
            decoy_hash: String::new(),
        };
        let decoy = SaltString::generate(&mut OsRng);
        hasher.decoy_hash = hasher.hash_password(decoy.as_str())?;
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a plaintext secret with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext secret against a stored hash in constant time.
    ///
    /// Returns `Ok(true)` on match, `Ok(false)` on mismatch.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }

    /// Spends one verification's worth of work without a real account.
    pub fn verify_decoy(&self, password: &str) {
        let _ = self.verify_password(password, &self.decoy_hash);
    }

    /// Whether `hash` was produced with parameters other than the current ones.
    pub fn needs_rehash(&self, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return true;
        };
        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }
        match Params::try_from(&parsed) {
            Ok(stored) => {
                stored.m_cost() != self.params.m_cost()
                    || stored.t_cost() != self.params.t_cost()
                    || stored.p_cost() != self.params.p_cost()
            }
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap(memory_kib: u32, iterations: u32) -> PasswordHasher {
        PasswordHasher::new(&AuthConfig {
            argon2_memory_kib: memory_kib,
            argon2_iterations: iterations,
            ..AuthConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = cheap(8 * 1024, 1);
        let hash = hasher.hash_password("P@ssw0rd").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("P@ssw0rd", &hash).unwrap());
        assert!(!hasher.verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_same_secret_different_salts() {
        let hasher = cheap(8 * 1024, 1);
        let a = hasher.hash_password("P@ssw0rd").unwrap();
        let b = hasher.hash_password("P@ssw0rd").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_needs_rehash_after_parameter_change() {
        let weak = cheap(8 * 1024, 1);
        let strong = cheap(8 * 1024, 2);
        let hash = weak.hash_password("P@ssw0rd").unwrap();

        assert!(!weak.needs_rehash(&hash));
        assert!(strong.needs_rehash(&hash));
        // Old hashes still verify under new parameters.
        assert!(strong.verify_password("P@ssw0rd", &hash).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_error() {
        let hasher = cheap(8 * 1024, 1);
        assert!(hasher.verify_password("x", "not-a-phc-string").is_err());
        assert!(hasher.needs_rehash("not-a-phc-string"));
    }
}
