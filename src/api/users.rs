//! User endpoints. Reads are open to any authenticated user; changes need ADMIN.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::db::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::AppState;

use super::auth::require_admin;
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_password, validate_path_id, validate_required, validate_username};

fn validate_create_request(req: &CreateUserRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors
        .check("username", validate_username(&req.username))
        .check("fullName", validate_required(&req.full_name, "Full name", 150))
        .check("password", validate_password(&req.password));
    errors.finish()
}

/// An empty password on update keeps the current one
fn validate_update_request(req: &UpdateUserRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors
        .check("username", validate_username(&req.username))
        .check("fullName", validate_required(&req.full_name, "Full name", 150));
    if let Some(password) = req.password.as_deref().filter(|p| !p.is_empty()) {
        errors.check("password", validate_password(password));
    }
    errors.finish()
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    Ok(Json(state.users.list().await?))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    validate_path_id(&id)?;
    Ok(Json(state.users.get(&id).await?))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    require_admin(&caller)?;
    validate_create_request(&req)?;
    let user = state.users.create(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    require_admin(&caller)?;
    validate_path_id(&id)?;
    validate_update_request(&req)?;
    Ok(Json(state.users.update(&id, req).await?))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_admin(&caller)?;
    validate_path_id(&id)?;
    state.users.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
