//! Password reset handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use validator::Validate;

use crate::dto::request::{PasswordResetConfirm, PasswordResetRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::ClientSource;
use crate::state::AppState;

/// POST /api/auth/password-reset/request
///
/// Answers the same way whether or not the identity exists.
pub async fn request_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MessageResponse>>), ApiError> {
    req.validate()?;
    state.accounts.request_password_reset(&req.identity).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::ok(MessageResponse::new(
            "If the account exists, password reset instructions have been sent",
        ))),
    ))
}

/// POST /api/auth/password-reset/confirm
pub async fn confirm_reset(
    State(state): State<AppState>,
    ClientSource(source): ClientSource,
    Json(req): Json<PasswordResetConfirm>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    req.validate()?;
    state
        .accounts
        .confirm_password_reset(&req.token, &req.new_password, &source)
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Password has been reset",
    ))))
}
