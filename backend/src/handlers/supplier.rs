//! HTTP handlers for suppliers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::models::Permission;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::customer::parse_active_filter;
use crate::middleware::CurrentUser;
use crate::services::supplier::{
    CreateSupplierInput, Supplier, SupplierWithDetails, UpdateSupplierInput,
};
use crate::services::SupplierService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListSuppliersQuery {
    pub search_term: Option<String>,
    /// "all" (default), "active" or "inactive"
    pub filter: Option<String>,
}

/// List suppliers with aggregate statistics
pub async fn list_suppliers(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListSuppliersQuery>,
) -> AppResult<Json<Vec<Supplier>>> {
    let service = SupplierService::new(state.db);
    let suppliers = service
        .list(
            query.search_term.as_deref(),
            parse_active_filter(query.filter.as_deref()),
        )
        .await?;
    Ok(Json(suppliers))
}

/// Get a supplier with its products and recent transactions
pub async fn get_supplier(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<Json<SupplierWithDetails>> {
    let service = SupplierService::new(state.db);
    let supplier = service.get_with_details(supplier_id).await?;
    Ok(Json(supplier))
}

/// Create a supplier
pub async fn create_supplier(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateSupplierInput>,
) -> AppResult<Json<Supplier>> {
    if !user.has_permission(Permission::ManageSuppliers) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = SupplierService::new(state.db);
    let supplier = service.create(input).await?;
    Ok(Json(supplier))
}

/// Update a supplier
pub async fn update_supplier(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(supplier_id): Path<Uuid>,
    Json(input): Json<UpdateSupplierInput>,
) -> AppResult<Json<Supplier>> {
    if !user.has_permission(Permission::ManageSuppliers) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = SupplierService::new(state.db);
    let supplier = service.update(supplier_id, input).await?;
    Ok(Json(supplier))
}

/// Delete a supplier (blocked while it has products)
pub async fn delete_supplier(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    if !user.has_permission(Permission::ManageSuppliers) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = SupplierService::new(state.db);
    service.delete(supplier_id).await?;
    Ok(Json(()))
}
