//! HTTP handlers for orders

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{OrderStatus, Permission};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::order::{
    CreateOrderInput, Order, OrderFilter, OrderWithItems, UpdateOrderInput,
};
use crate::services::OrderService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Response shape shared by the order AJAX endpoints
#[derive(Debug, Serialize)]
pub struct StatusUpdateResponse {
    pub success: bool,
    pub message: String,
}

/// Product summary returned to the order form (AJAX)
#[derive(Debug, Serialize)]
pub struct ProductDetailsResponse {
    pub success: bool,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
}

/// List orders matching the filter
pub async fn list_orders(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<OrderFilter>,
) -> AppResult<Json<Vec<Order>>> {
    let service = OrderService::new(state.db);
    let orders = service.list(&filter).await?;
    Ok(Json(orders))
}

/// Get an order with its line items
pub async fn get_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderWithItems>> {
    let service = OrderService::new(state.db);
    let order = service.get(order_id).await?;
    Ok(Json(order))
}

/// Create an order
pub async fn create_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<Json<OrderWithItems>> {
    if !user.has_permission(Permission::ManageOrders) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = OrderService::new(state.db);
    let order = service.create(input).await?;
    Ok(Json(order))
}

/// Edit an order
pub async fn update_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateOrderInput>,
) -> AppResult<Json<OrderWithItems>> {
    if !user.has_permission(Permission::ManageOrders) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = OrderService::new(state.db);
    let order = service.update(order_id, input).await?;
    Ok(Json(order))
}

/// Delete an order
pub async fn delete_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    if !user.has_permission(Permission::ManageOrders) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = OrderService::new(state.db);
    service.delete(order_id).await?;
    Ok(Json(()))
}

/// Status-only update from the order list view (AJAX)
pub async fn update_order_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> AppResult<Json<StatusUpdateResponse>> {
    if !user.has_permission(Permission::ManageOrders) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = OrderService::new(state.db);
    service.update_status(order_id, body.status).await?;

    Ok(Json(StatusUpdateResponse {
        success: true,
        message: "Status updated successfully".to_string(),
    }))
}

/// Product name, price and stock for the order form (AJAX)
pub async fn get_product_details(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductDetailsResponse>> {
    let service = OrderService::new(state.db);
    let details = service.product_details(product_id).await?;

    Ok(Json(ProductDetailsResponse {
        success: true,
        name: details.name,
        price: details.price,
        stock: details.stock,
    }))
}
