//! HTTP handlers for user administration

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::models::Permission;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::customer::parse_active_filter;
use crate::middleware::CurrentUser;
use crate::services::user::{CreateUserInput, UpdateUserInput, User};
use crate::services::UserService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub search_term: Option<String>,
    /// "all" (default), "active" or "inactive"
    pub filter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

/// Summary returned by the user-details endpoint (AJAX)
#[derive(Debug, Serialize)]
pub struct UserDetailsResponse {
    pub success: bool,
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub is_active: bool,
    pub roles: Vec<String>,
}

/// List users with their roles
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<Json<Vec<User>>> {
    if !user.has_permission(Permission::ManageUsers) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = UserService::new(state.db);
    let users = service
        .list(
            query.search_term.as_deref(),
            parse_active_filter(query.filter.as_deref()),
        )
        .await?;
    Ok(Json(users))
}

/// Get a user with their roles
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<User>> {
    if !user.has_permission(Permission::ManageUsers) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = UserService::new(state.db);
    let found = service.get(user_id).await?;
    Ok(Json(found))
}

/// Create a user account
pub async fn create_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateUserInput>,
) -> AppResult<Json<User>> {
    if !user.has_permission(Permission::ManageUsers) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = UserService::new(state.db);
    let created = service.create(input).await?;
    Ok(Json(created))
}

/// Edit a user account
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<Json<User>> {
    if !user.has_permission(Permission::ManageUsers) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = UserService::new(state.db);
    let updated = service.update(user_id, input).await?;
    Ok(Json(updated))
}

/// Delete a user account
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    if !user.has_permission(Permission::ManageUsers) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = UserService::new(state.db);
    service.delete(user_id).await?;
    Ok(Json(()))
}

/// Administrative password reset
pub async fn reset_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(body): Json<ResetPasswordRequest>,
) -> AppResult<Json<()>> {
    if !user.has_permission(Permission::ManageUsers) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = UserService::new(state.db);
    service.reset_password(user_id, &body.new_password).await?;
    Ok(Json(()))
}

/// Deactivate a user account
pub async fn deactivate_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    if !user.has_permission(Permission::ManageUsers) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = UserService::new(state.db);
    service.deactivate(user_id).await?;
    Ok(Json(()))
}

/// Reactivate a user account
pub async fn activate_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    if !user.has_permission(Permission::ManageUsers) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = UserService::new(state.db);
    service.activate(user_id).await?;
    Ok(Json(()))
}

/// User summary for the admin list view (AJAX)
pub async fn get_user_details(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<UserDetailsResponse>> {
    if !user.has_permission(Permission::ManageUsers) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = UserService::new(state.db);
    let found = service.get(user_id).await?;

    Ok(Json(UserDetailsResponse {
        success: true,
        id: found.id,
        full_name: format!("{} {}", found.first_name, found.last_name),
        email: found.email,
        username: found.username,
        is_active: found.is_active,
        roles: found.roles,
    }))
}
