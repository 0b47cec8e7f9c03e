//! Maps domain `AppError` to HTTP responses.
//!
//! Security-sensitive kinds leave with a fixed public message so callers
//! cannot tell an unknown identity from a wrong secret, or an expired token
//! from a forged one. The full kind and message are logged here.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use cesizen_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// An [`AppError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError {
    pub error: AppError,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Login must not reveal whether the identity exists.
    pub fn from_login(err: AppError) -> Self {
        if err.kind == ErrorKind::NotFound {
            return AppError::with_source(ErrorKind::InvalidCredentials, "Unknown identity", err)
                .into();
        }
        err.into()
    }

    /// Status, error code and the message shown to the caller.
    fn public_parts(&self) -> (StatusCode, &'static str, String) {
        let kind = self.error.kind;
        if kind.is_token_failure() {
            return (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "unauthorized".into());
        }
        if kind.is_reset_failure() {
            return (
                StatusCode::BAD_REQUEST,
                "PASSWORD_RESET_FAILED",
                "password reset failed".into(),
            );
        }
        match kind {
            ErrorKind::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "AUTHENTICATION_FAILED",
                "authentication failed".into(),
            ),
            ErrorKind::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "too many failed attempts".into(),
            ),
            ErrorKind::AccountLocked => (
                StatusCode::FORBIDDEN,
                "ACCOUNT_LOCKED",
                "account is locked".into(),
            ),
            ErrorKind::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", self.error.message.clone()),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", self.error.message.clone()),
            ErrorKind::DuplicateIdentity => (
                StatusCode::CONFLICT,
                "DUPLICATE_IDENTITY",
                "identity is already registered".into(),
            ),
            ErrorKind::DuplicateEmail => (
                StatusCode::CONFLICT,
                "DUPLICATE_EMAIL",
                "email is already registered".into(),
            ),
            ErrorKind::Validation => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                self.error.message.clone(),
            ),
            ErrorKind::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "service temporarily unavailable".into(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "internal server error".into(),
            ),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self {
            error,
            details: None,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self {
            details: serde_json::to_value(&errors).ok(),
            error: AppError::validation("Request validation failed"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = self.public_parts();

        let detail = std::error::Error::source(&self.error)
            .map(|s| s.to_string())
            .unwrap_or_default();
        if status.is_server_error() {
            error!(kind = %self.error.kind, error = %self.error.message, cause = %detail, "Request failed");
        } else if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::TOO_MANY_REQUESTS) {
            warn!(kind = %self.error.kind, error = %self.error.message, cause = %detail, "Request rejected");
        } else {
            debug!(kind = %self.error.kind, error = %self.error.message, "Request rejected");
        }

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message,
            details: self.details,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(seconds) = self.error.retry_after_seconds {
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
