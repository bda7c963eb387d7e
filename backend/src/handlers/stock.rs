//! HTTP handlers for stock transactions

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::models::Permission;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::stock::{
    BulkPurchaseItem, RecordTransactionInput, StockFilter, StockTransaction,
};
use crate::services::StockService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BulkPurchaseRequest {
    pub supplier_id: Uuid,
    pub items: Vec<BulkPurchaseItem>,
}

/// Response for the bulk-purchase endpoint
#[derive(Debug, Serialize)]
pub struct BulkPurchaseResponse {
    pub success: bool,
    pub message: String,
    pub reference_number: String,
    pub applied_items: usize,
    pub skipped_items: usize,
}

/// List stock transactions matching the filter
pub async fn list_transactions(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<StockFilter>,
) -> AppResult<Json<Vec<StockTransaction>>> {
    let service = StockService::new(state.db);
    let transactions = service.list(&filter).await?;
    Ok(Json(transactions))
}

/// Get a stock transaction by id
pub async fn get_transaction(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<StockTransaction>> {
    let service = StockService::new(state.db);
    let transaction = service.get(transaction_id).await?;
    Ok(Json(transaction))
}

/// Record a stock transaction and apply its effect
pub async fn record_transaction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<RecordTransactionInput>,
) -> AppResult<Json<StockTransaction>> {
    if !user.has_permission(Permission::ManageInventory) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = StockService::new(state.db);
    let transaction = service.record(user.user_id, input).await?;
    Ok(Json(transaction))
}

/// Delete a stock transaction, reversing its effect
pub async fn delete_transaction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    if !user.has_permission(Permission::ManageInventory) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = StockService::new(state.db);
    service.delete(transaction_id).await?;
    Ok(Json(()))
}

/// Record a batch of purchase lines under one reference number (AJAX)
pub async fn bulk_purchase(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<BulkPurchaseRequest>,
) -> AppResult<Json<BulkPurchaseResponse>> {
    if !user.has_permission(Permission::ManageInventory) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = StockService::new(state.db);
    let outcome = service
        .bulk_purchase(user.user_id, body.supplier_id, body.items)
        .await?;

    Ok(Json(BulkPurchaseResponse {
        success: true,
        message: "Bulk purchase completed successfully".to_string(),
        reference_number: outcome.reference_number,
        applied_items: outcome.applied_items,
        skipped_items: outcome.skipped_items,
    }))
}
