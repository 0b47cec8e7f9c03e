//! Self-service handlers for the authenticated caller.

use axum::Json;
use axum::extract::State;
use validator::Validate;

use cesizen_entity::account::ProfileUpdate;

use crate::dto::request::{ChangePasswordRequest, UpdateProfileRequest};
use crate::dto::response::{AccountResponse, ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users/me
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<AccountResponse>>, ApiError> {
    let account = state.accounts.me(&auth).await?;
    Ok(Json(ApiResponse::ok(account.into())))
}

/// PUT /api/users/me
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<AccountResponse>>, ApiError> {
    req.validate()?;
    let account = state
        .accounts
        .update_profile(
            &auth,
            ProfileUpdate {
                email: req.email,
                full_name: req.full_name,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(account.into())))
}

/// PUT /api/users/me/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    req.validate()?;
    state
        .accounts
        .change_password(&auth, &req.current_password, &req.new_password)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Password changed",
    ))))
}
