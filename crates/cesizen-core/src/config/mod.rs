//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files and `CESIZEN__`-prefixed environment variables. Each
//! sub-module represents a logical configuration section.

pub mod admin;
pub mod app;
pub mod auth;
pub mod logging;
pub mod rate_limit;
pub mod store;

use serde::Deserialize;

pub use self::admin::AdminConfig;
pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::{AuthConfig, MIN_SIGNING_SECRET_LEN};
pub use self::logging::LoggingConfig;
pub use self::rate_limit::RateLimitConfig;
pub use self::store::StoreConfig;

use crate::error::AppError;

/// Longest accepted session token lifetime (one week).
pub const MAX_TOKEN_TTL_MINUTES: u64 = 7 * 24 * 60;
/// Longest accepted reset token lifetime (one day).
pub const MAX_RESET_TOKEN_TTL_MINUTES: u64 = 24 * 60;
/// Longest accepted clock-skew leeway.
pub const MAX_TOKEN_LEEWAY_SECONDS: u64 = 5 * 60;
/// Longest accepted rate-limit window, lockout or sweep interval (one week).
pub const MAX_RATE_LIMIT_SECONDS: u64 = 7 * 24 * 60 * 60;
/// Most attempts a transient store failure may be retried with.
pub const MAX_RETRY_ATTEMPTS: u32 = 10;
/// Longest accepted base retry backoff.
pub const MAX_RETRY_BACKOFF_MS: u64 = 10_000;

/// Root application configuration.
///
/// Loaded once at startup, validated, then handed to each component
/// constructor. Nothing reads the environment after this point.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Token, hashing and password policy settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Bootstrap administrator.
    #[serde(default)]
    pub admin: AdminConfig,
    /// Credential store location.
    #[serde(default)]
    pub store: StoreConfig,
    /// Failed-attempt lockout policy.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files and the environment.
    ///
    /// Merges `path` with an environment-specific overlay
    /// (`config/{env}`) and environment variables prefixed with `CESIZEN__`,
    /// then validates the result.
    pub fn load(path: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CESIZEN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the service must not start with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.signing_secret.is_empty() {
            return Err(AppError::configuration(
                "auth.signing_secret is required (CESIZEN__AUTH__SIGNING_SECRET)",
            ));
        }
        if self.auth.signing_secret.len() < MIN_SIGNING_SECRET_LEN {
            return Err(AppError::configuration(format!(
                "auth.signing_secret must be at least {MIN_SIGNING_SECRET_LEN} bytes"
            )));
        }
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&self.auth.token_ttl_minutes) {
            return Err(AppError::configuration(format!(
                "auth.token_ttl_minutes must be between 1 and {MAX_TOKEN_TTL_MINUTES}"
            )));
        }
        if self.auth.token_leeway_seconds > MAX_TOKEN_LEEWAY_SECONDS {
            return Err(AppError::configuration(format!(
                "auth.token_leeway_seconds must be at most {MAX_TOKEN_LEEWAY_SECONDS}"
            )));
        }
        if !(1..=MAX_RESET_TOKEN_TTL_MINUTES).contains(&self.auth.reset_token_ttl_minutes) {
            return Err(AppError::configuration(format!(
                "auth.reset_token_ttl_minutes must be between 1 and {MAX_RESET_TOKEN_TTL_MINUTES}"
            )));
        }
        if self.auth.password_min_strength > 4 {
            return Err(AppError::configuration(
                "auth.password_min_strength must be between 0 and 4",
            ));
        }
        if self.store.connection_target.trim().is_empty() {
            return Err(AppError::configuration(
                "store.connection_target is required (CESIZEN__STORE__CONNECTION_TARGET)",
            ));
        }
        if self.admin.identity.trim().is_empty() || self.admin.secret.is_empty() {
            return Err(AppError::configuration(
                "admin.identity and admin.secret are required",
            ));
        }
        let limits = &self.rate_limit;
        if limits.max_failures == 0 {
            return Err(AppError::configuration(
                "rate_limit.max_failures must be non-zero",
            ));
        }
        for (name, seconds) in [
            ("window_seconds", limits.window_seconds),
            ("lockout_seconds", limits.lockout_seconds),
            ("sweep_interval_seconds", limits.sweep_interval_seconds),
        ] {
            if !(1..=MAX_RATE_LIMIT_SECONDS).contains(&seconds) {
                return Err(AppError::configuration(format!(
                    "rate_limit.{name} must be between 1 and {MAX_RATE_LIMIT_SECONDS}"
                )));
            }
        }
        if !(1..=MAX_RETRY_ATTEMPTS).contains(&self.store.retry_attempts) {
            return Err(AppError::configuration(format!(
                "store.retry_attempts must be between 1 and {MAX_RETRY_ATTEMPTS}"
            )));
        }
        if self.store.retry_backoff_ms > MAX_RETRY_BACKOFF_MS {
            return Err(AppError::configuration(format!(
                "store.retry_backoff_ms must be at most {MAX_RETRY_BACKOFF_MS}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn valid() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.signing_secret = "0123456789abcdef0123456789abcdef".to_string();
        config.store.connection_target = "memory://".to_string();
        config.admin.identity = "admin".to_string();
        config.admin.secret = "Adm1n!secret".to_string();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_missing_signing_secret_is_fatal() {
        let mut config = valid();
        config.auth.signing_secret.clear();
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("signing_secret"));
    }

    #[test]
    fn test_short_signing_secret_is_fatal() {
        let mut config = valid();
        config.auth.signing_secret = "too-short".to_string();
        assert_eq!(config.validate().unwrap_err().kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_missing_store_target_is_fatal() {
        let mut config = valid();
        config.store.connection_target = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.message.contains("connection_target"));
    }

    #[test]
    fn test_missing_admin_secret_is_fatal() {
        let mut config = valid();
        config.admin.secret.clear();
        assert_eq!(config.validate().unwrap_err().kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_zero_rate_limit_is_fatal() {
        let mut config = valid();
        config.rate_limit.max_failures = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_sweep_interval_is_fatal() {
        let mut config = valid();
        config.rate_limit.sweep_interval_seconds = 0;
        let err = config.validate().unwrap_err();
        assert!(err.message.contains("sweep_interval_seconds"));
    }

    #[test]
    fn test_oversized_durations_are_fatal() {
        let mut config = valid();
        config.rate_limit.lockout_seconds = u64::MAX;
        assert!(config.validate().unwrap_err().message.contains("lockout_seconds"));

        let mut config = valid();
        config.rate_limit.window_seconds = MAX_RATE_LIMIT_SECONDS + 1;
        assert!(config.validate().unwrap_err().message.contains("window_seconds"));

        let mut config = valid();
        config.auth.token_ttl_minutes = u64::MAX;
        assert!(config.validate().unwrap_err().message.contains("token_ttl_minutes"));

        let mut config = valid();
        config.auth.reset_token_ttl_minutes = u64::MAX / 60;
        assert!(
            config
                .validate()
                .unwrap_err()
                .message
                .contains("reset_token_ttl_minutes")
        );

        let mut config = valid();
        config.store.retry_attempts = 0;
        assert!(config.validate().unwrap_err().message.contains("retry_attempts"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", valid());
        assert!(!rendered.contains("0123456789abcdef"));
        assert!(!rendered.contains("Adm1n!secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_rate_limit_defaults() {
        let limits = RateLimitConfig::default();
        assert_eq!(limits.max_failures, 5);
        assert_eq!(limits.window_seconds, 900);
        assert_eq!(limits.lockout_seconds, 900);
    }
}
