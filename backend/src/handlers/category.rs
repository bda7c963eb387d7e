//! HTTP handlers for categories

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::models::Permission;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::category::{Category, CreateCategoryInput, UpdateCategoryInput};
use crate::services::CategoryService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListCategoriesQuery {
    pub search_term: Option<String>,
}

/// List categories with product counts
pub async fn list_categories(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListCategoriesQuery>,
) -> AppResult<Json<Vec<Category>>> {
    let service = CategoryService::new(state.db);
    let categories = service.list(query.search_term.as_deref()).await?;
    Ok(Json(categories))
}

/// Get a category by id
pub async fn get_category(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<Category>> {
    let service = CategoryService::new(state.db);
    let category = service.get(category_id).await?;
    Ok(Json(category))
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<Json<Category>> {
    if !user.has_permission(Permission::ManageCategories) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = CategoryService::new(state.db);
    let category = service.create(input).await?;
    Ok(Json(category))
}

/// Update a category
pub async fn update_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(input): Json<UpdateCategoryInput>,
) -> AppResult<Json<Category>> {
    if !user.has_permission(Permission::ManageCategories) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = CategoryService::new(state.db);
    let category = service.update(category_id, input).await?;
    Ok(Json(category))
}

/// Delete a category (blocked while products reference it)
pub async fn delete_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    if !user.has_permission(Permission::ManageCategories) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = CategoryService::new(state.db);
    service.delete(category_id).await?;
    Ok(Json(()))
}
