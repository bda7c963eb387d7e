//! HTTP handlers for brands

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::models::Permission;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::brand::{Brand, CreateBrandInput, UpdateBrandInput};
use crate::services::BrandService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListBrandsQuery {
    pub search_term: Option<String>,
}

/// List brands with product counts
pub async fn list_brands(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListBrandsQuery>,
) -> AppResult<Json<Vec<Brand>>> {
    let service = BrandService::new(state.db);
    let brands = service.list(query.search_term.as_deref()).await?;
    Ok(Json(brands))
}

/// Get a brand by id
pub async fn get_brand(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(brand_id): Path<Uuid>,
) -> AppResult<Json<Brand>> {
    let service = BrandService::new(state.db);
    let brand = service.get(brand_id).await?;
    Ok(Json(brand))
}

/// Create a brand
pub async fn create_brand(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateBrandInput>,
) -> AppResult<Json<Brand>> {
    if !user.has_permission(Permission::ManageBrands) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = BrandService::new(state.db);
    let brand = service.create(input).await?;
    Ok(Json(brand))
}

/// Update a brand
pub async fn update_brand(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(brand_id): Path<Uuid>,
    Json(input): Json<UpdateBrandInput>,
) -> AppResult<Json<Brand>> {
    if !user.has_permission(Permission::ManageBrands) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = BrandService::new(state.db);
    let brand = service.update(brand_id, input).await?;
    Ok(Json(brand))
}

/// Delete a brand (blocked while products reference it)
pub async fn delete_brand(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(brand_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    if !user.has_permission(Permission::ManageBrands) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = BrandService::new(state.db);
    service.delete(brand_id).await?;
    Ok(Json(()))
}
