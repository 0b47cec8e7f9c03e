//! Admin account management handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;
use validator::Validate;

use cesizen_entity::account::ProfileUpdate;

use crate::dto::request::{
    ChangeRoleRequest, ChangeStatusRequest, ListAccountsQuery, UpdateProfileRequest,
};
use crate::dto::response::{AccountResponse, ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListAccountsQuery>,
) -> Result<Json<ApiResponse<Vec<AccountResponse>>>, ApiError> {
    let accounts = state
        .admin
        .list_accounts(&auth, params.skip, params.limit)
        .await?;
    Ok(Json(ApiResponse::ok(
        accounts.into_iter().map(AccountResponse::from).collect(),
    )))
}

/// GET /api/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AccountResponse>>, ApiError> {
    let account = state.admin.get_account(&auth, id).await?;
    Ok(Json(ApiResponse::ok(account.into())))
}

/// GET /api/admin/users/by-identity/{identity}
pub async fn get_user_by_identity(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(identity): Path<String>,
) -> Result<Json<ApiResponse<AccountResponse>>, ApiError> {
    let account = state.admin.get_by_identity(&auth, &identity).await?;
    Ok(Json(ApiResponse::ok(account.into())))
}

/// PUT /api/admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<AccountResponse>>, ApiError> {
    req.validate()?;
    let account = state
        .admin
        .update_profile(
            &auth,
            id,
            ProfileUpdate {
                email: req.email,
                full_name: req.full_name,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(account.into())))
}

/// PUT /api/admin/users/{id}/role
pub async fn change_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeRoleRequest>,
) -> Result<Json<ApiResponse<AccountResponse>>, ApiError> {
    let account = state.admin.change_role(&auth, id, req.role).await?;
    Ok(Json(ApiResponse::ok(account.into())))
}

/// PUT /api/admin/users/{id}/status
pub async fn change_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<ApiResponse<AccountResponse>>, ApiError> {
    let account = state.admin.set_status(&auth, id, req.status).await?;
    Ok(Json(ApiResponse::ok(account.into())))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.admin.delete_account(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Account deleted"))))
}
