//! HTTP handlers for the product catalog

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::models::Permission;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::product::{
    CreateProductInput, Product, ProductSort, UpdateProductInput,
};
use crate::services::ProductService;
use crate::AppState;

/// Query parameters for the product listing
#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub search_term: Option<String>,
    pub sort: Option<ProductSort>,
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: i32,
}

/// List products with optional search and sort
pub async fn list_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListProductsQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let service = ProductService::new(state.db);
    let products = service
        .list(query.search_term.as_deref(), query.sort)
        .await?;
    Ok(Json(products))
}

/// Active products at or below the configured low-stock threshold
pub async fn low_stock_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Product>>> {
    let threshold = state.config.dashboard.low_stock_threshold;
    let service = ProductService::new(state.db);
    let products = service.low_stock(threshold).await?;
    Ok(Json(products))
}

/// Get a product by id
pub async fn get_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.get(product_id).await?;
    Ok(Json(product))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<Product>> {
    if !user.has_permission(Permission::ManageProducts) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = ProductService::new(state.db);
    let product = service.create(input).await?;
    Ok(Json(product))
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    if !user.has_permission(Permission::ManageProducts) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = ProductService::new(state.db);
    let product = service.update(product_id, input).await?;
    Ok(Json(product))
}

/// Soft delete a product
pub async fn delete_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    if !user.has_permission(Permission::ManageProducts) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = ProductService::new(state.db);
    service.deactivate(product_id).await?;
    Ok(Json(()))
}

/// Add stock to a product
pub async fn restock_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(body): Json<RestockRequest>,
) -> AppResult<Json<Product>> {
    if !user.has_any_permission(&[Permission::ManageProducts, Permission::ManageInventory]) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = ProductService::new(state.db);
    let product = service.restock(product_id, body.quantity).await?;
    Ok(Json(product))
}
