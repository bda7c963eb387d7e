//! HTTP handlers for role management

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::models::Permission;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::role::{CreateRoleInput, Role, RoleWithMembers, UpdateRoleInput};
use crate::services::RoleService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListRolesQuery {
    pub search_term: Option<String>,
}

/// Response for the list of assignable capabilities
#[derive(Debug, Serialize)]
pub struct PermissionsResponse {
    pub permissions: Vec<&'static str>,
}

/// Response for the role-membership endpoints (AJAX)
#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub success: bool,
    pub message: String,
}

/// List roles, system roles first
pub async fn list_roles(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListRolesQuery>,
) -> AppResult<Json<Vec<Role>>> {
    if !user.has_permission(Permission::ManageRoles) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = RoleService::new(state.db);
    let roles = service.list(query.search_term.as_deref()).await?;
    Ok(Json(roles))
}

/// All capabilities a role can be granted
pub async fn list_permissions(
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<PermissionsResponse>> {
    if !user.has_permission(Permission::ManageRoles) {
        return Err(AppError::InsufficientPermissions);
    }

    Ok(Json(PermissionsResponse {
        permissions: Permission::ALL.iter().map(|p| p.as_str()).collect(),
    }))
}

/// Get a role with its assigned users
pub async fn get_role(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(role_id): Path<Uuid>,
) -> AppResult<Json<RoleWithMembers>> {
    if !user.has_permission(Permission::ManageRoles) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = RoleService::new(state.db);
    let role = service.get_with_members(role_id).await?;
    Ok(Json(role))
}

/// Create a role
pub async fn create_role(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateRoleInput>,
) -> AppResult<Json<Role>> {
    if !user.has_permission(Permission::ManageRoles) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = RoleService::new(state.db);
    let role = service.create(input).await?;
    Ok(Json(role))
}

/// Update a role (rejected for system roles)
pub async fn update_role(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(role_id): Path<Uuid>,
    Json(input): Json<UpdateRoleInput>,
) -> AppResult<Json<Role>> {
    if !user.has_permission(Permission::ManageRoles) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = RoleService::new(state.db);
    let role = service.update(role_id, input).await?;
    Ok(Json(role))
}

/// Delete a role (rejected for system roles and roles with users)
pub async fn delete_role(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(role_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    if !user.has_permission(Permission::ManageRoles) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = RoleService::new(state.db);
    service.delete(role_id).await?;
    Ok(Json(()))
}

/// Assign a user to a role (AJAX)
pub async fn add_role_member(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((role_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<MembershipResponse>> {
    if !user.has_permission(Permission::ManageRoles) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = RoleService::new(state.db);
    service.add_member(role_id, user_id).await?;

    Ok(Json(MembershipResponse {
        success: true,
        message: "User added to role successfully".to_string(),
    }))
}

/// Remove a user from a role (AJAX)
pub async fn remove_role_member(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((role_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<MembershipResponse>> {
    if !user.has_permission(Permission::ManageRoles) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = RoleService::new(state.db);
    service.remove_member(role_id, user_id).await?;

    Ok(Json(MembershipResponse {
        success: true,
        message: "User removed from role successfully".to_string(),
    }))
}
