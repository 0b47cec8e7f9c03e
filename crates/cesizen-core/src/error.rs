//! Unified application error types.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the `?` operator. The [`ErrorKind`] taxonomy is
//! detailed on purpose: the HTTP boundary decides how much of it a caller
//! gets to see, while logs always carry the full kind and message.

use std::fmt;

use thiserror::Error;

/// Error kind categorization used across the entire service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// An account with the same identity already exists.
    DuplicateIdentity,
    /// An account with the same email already exists.
    DuplicateEmail,
    /// The requested record was not found.
    NotFound,
    /// The supplied secret does not match the stored hash.
    InvalidCredentials,
    /// The account status is `locked`.
    AccountLocked,
    /// Too many failed attempts; the attempt key is locked out.
    RateLimited,
    /// The reset token is unknown (never issued or superseded).
    InvalidResetToken,
    /// The reset token is past its expiry.
    ExpiredResetToken,
    /// The reset token was already used.
    ResetTokenConsumed,
    /// The session token could not be parsed.
    MalformedToken,
    /// The session token signature does not verify.
    BadSignature,
    /// The session token is past its expiry.
    TokenExpired,
    /// The session token was signed with an unexpected algorithm.
    AlgorithmMismatch,
    /// No usable credential was presented.
    Unauthorized,
    /// The caller's role does not permit the operation.
    Forbidden,
    /// Input validation failed.
    Validation,
    /// Configuration is missing or invalid.
    Configuration,
    /// A transient infrastructure failure (store unreachable, pool timeout).
    Unavailable,
    /// A non-transient database error.
    Database,
    /// An internal error.
    Internal,
}

impl ErrorKind {
    /// Whether the failure is worth retrying after a backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    /// Whether this is one of the session-token verification failures.
    pub fn is_token_failure(&self) -> bool {
        matches!(
            self,
            Self::MalformedToken
                | Self::BadSignature
                | Self::TokenExpired
                | Self::AlgorithmMismatch
                | Self::Unauthorized
        )
    }

    /// Whether this is one of the reset-token consumption failures.
    pub fn is_reset_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidResetToken | Self::ExpiredResetToken | Self::ResetTokenConsumed
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DuplicateIdentity => "DUPLICATE_IDENTITY",
            Self::DuplicateEmail => "DUPLICATE_EMAIL",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountLocked => "ACCOUNT_LOCKED",
            Self::RateLimited => "RATE_LIMITED",
            Self::InvalidResetToken => "INVALID_RESET_TOKEN",
            Self::ExpiredResetToken => "EXPIRED_RESET_TOKEN",
            Self::ResetTokenConsumed => "RESET_TOKEN_CONSUMED",
            Self::MalformedToken => "MALFORMED_TOKEN",
            Self::BadSignature => "BAD_SIGNATURE",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::AlgorithmMismatch => "ALGORITHM_MISMATCH",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Validation => "VALIDATION",
            Self::Configuration => "CONFIGURATION",
            Self::Unavailable => "UNAVAILABLE",
            Self::Database => "DATABASE",
            Self::Internal => "INTERNAL",
        };
        f.write_str(name)
    }
}

/// The unified application error.
///
/// Crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable message for diagnostics. Not shown to callers for
    /// security-sensitive kinds.
    pub message: String,
    /// Seconds until a rate-limit lockout ends.
    pub retry_after_seconds: Option<u64>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after_seconds: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after_seconds: None,
            source: Some(Box::new(source)),
        }
    }

    pub fn duplicate_identity(identity: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateIdentity,
            format!("Identity '{identity}' is already registered"),
        )
    }

    pub fn duplicate_email() -> Self {
        Self::new(ErrorKind::DuplicateEmail, "Email is already registered")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "Secret does not match")
    }

    pub fn account_locked() -> Self {
        Self::new(ErrorKind::AccountLocked, "Account is locked")
    }

    /// Create a rate-limit lockout error carrying the remaining lock time.
    pub fn rate_limited(remaining_seconds: u64) -> Self {
        Self {
            retry_after_seconds: Some(remaining_seconds),
            ..Self::new(
                ErrorKind::RateLimited,
                format!("Too many failed attempts; locked for {remaining_seconds}s"),
            )
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            retry_after_seconds: self.retry_after_seconds,
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Internal,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_families() {
        assert!(ErrorKind::BadSignature.is_token_failure());
        assert!(ErrorKind::AlgorithmMismatch.is_token_failure());
        assert!(!ErrorKind::InvalidCredentials.is_token_failure());
        assert!(ErrorKind::ResetTokenConsumed.is_reset_failure());
        assert!(!ErrorKind::TokenExpired.is_reset_failure());
        assert!(ErrorKind::Unavailable.is_transient());
        assert!(!ErrorKind::Database.is_transient());
    }

    #[test]
    fn test_rate_limited_carries_remaining() {
        let err = AppError::rate_limited(42);
        assert_eq!(err.kind, ErrorKind::RateLimited);
        assert_eq!(err.retry_after_seconds, Some(42));
        assert_eq!(err.clone().retry_after_seconds, Some(42));
    }

    #[test]
    fn test_display() {
        let err = AppError::duplicate_identity("alice");
        assert_eq!(
            err.to_string(),
            "DUPLICATE_IDENTITY: Identity 'alice' is already registered"
        );
    }
}
