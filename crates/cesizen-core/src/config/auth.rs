//! Authentication configuration.

use std::fmt;

use serde::Deserialize;

/// Credential and token configuration.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 key for session token signing. Required.
    #[serde(default)]
    pub signing_secret: String,
    /// Session token lifetime in minutes.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: u64,
    /// Clock skew tolerated when checking token expiry.
    #[serde(default)]
    pub token_leeway_seconds: u64,
    /// `iss` claim written into and required from session tokens.
    #[serde(default = "default_issuer")]
    pub token_issuer: String,
    /// Reset token lifetime in minutes.
    #[serde(default = "default_reset_ttl")]
    pub reset_token_ttl_minutes: u64,
    /// Log raw reset tokens when dispatching them. Development only.
    #[serde(default)]
    pub expose_reset_tokens: bool,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Require at least one uppercase letter, one lowercase letter and one digit.
    #[serde(default = "default_true")]
    pub password_require_mixed: bool,
    /// Minimum zxcvbn score (0-4). `0` disables the entropy check.
    #[serde(default)]
    pub password_min_strength: u8,
    /// Argon2id memory cost in KiB.
    #[serde(default = "default_argon2_memory")]
    pub argon2_memory_kib: u32,
    /// Argon2id iteration count.
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    /// Argon2id lane count.
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

/// Minimum signing secret length in bytes.
pub const MIN_SIGNING_SECRET_LEN: usize = 32;

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_secret", &"[REDACTED]")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("token_leeway_seconds", &self.token_leeway_seconds)
            .field("token_issuer", &self.token_issuer)
            .field("reset_token_ttl_minutes", &self.reset_token_ttl_minutes)
            .field("expose_reset_tokens", &self.expose_reset_tokens)
            .field("password_min_length", &self.password_min_length)
            .field("password_require_mixed", &self.password_require_mixed)
            .field("password_min_strength", &self.password_min_strength)
            .field("argon2_memory_kib", &self.argon2_memory_kib)
            .field("argon2_iterations", &self.argon2_iterations)
            .field("argon2_parallelism", &self.argon2_parallelism)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_secret: String::new(),
            token_ttl_minutes: default_token_ttl(),
            token_leeway_seconds: 0,
            token_issuer: default_issuer(),
            reset_token_ttl_minutes: default_reset_ttl(),
            expose_reset_tokens: false,
            password_min_length: default_password_min(),
            password_require_mixed: true,
            password_min_strength: 0,
            argon2_memory_kib: default_argon2_memory(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

fn default_token_ttl() -> u64 {
    30
}

fn default_issuer() -> String {
    "cesizen-auth".to_string()
}

fn default_reset_ttl() -> u64 {
    30
}

fn default_password_min() -> usize {
    8
}

fn default_true() -> bool {
    true
}

// OWASP baseline for Argon2id: m=19 MiB, t=2, p=1.
fn default_argon2_memory() -> u32 {
    19 * 1024
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_argon2_parallelism() -> u32 {
    1
}
