//! Auth handlers: register, login, verify.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use validator::Validate;

use cesizen_service::account::Registration;

use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::dto::response::{AccountResponse, ApiResponse, LoginResponse, VerifyResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccountResponse>>), ApiError> {
    req.validate()?;

    let account = state
        .accounts
        .register(Registration {
            identity: req.identity,
            secret: req.password,
            role: req.role,
            email: req.email,
            full_name: req.full_name,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(AccountResponse::from(account))),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    req.validate()?;

    let outcome = state
        .accounts
        .login(&req.identity, &req.password)
        .await
        .map_err(ApiError::from_login)?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        access_token: outcome.token.token,
        token_type: "bearer".to_string(),
        expires_at: outcome.token.expires_at,
        account: AccountResponse::from(outcome.account),
    })))
}

/// GET /api/auth/verify
pub async fn verify(auth: AuthUser) -> Json<ApiResponse<VerifyResponse>> {
    Json(ApiResponse::ok(VerifyResponse::from(auth.principal)))
}
