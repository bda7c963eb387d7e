//! HTTP handlers for customers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::models::Permission;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::customer::{
    CreateCustomerInput, Customer, CustomerWithOrders, UpdateCustomerInput,
};
use crate::services::CustomerService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListCustomersQuery {
    pub search_term: Option<String>,
    /// "all" (default), "active" or "inactive"
    pub filter: Option<String>,
}

/// Parse the active/inactive filter the list views share
pub(crate) fn parse_active_filter(filter: Option<&str>) -> Option<bool> {
    match filter {
        Some("active") => Some(true),
        Some("inactive") => Some(false),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
pub struct QuickCreateRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Response for the quick-create endpoint used by the order form
#[derive(Debug, Serialize)]
pub struct QuickCreateResponse {
    pub success: bool,
    pub message: String,
    pub customer_id: Uuid,
    pub customer_name: String,
}

/// List customers with search and active filter
pub async fn list_customers(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListCustomersQuery>,
) -> AppResult<Json<Vec<Customer>>> {
    let service = CustomerService::new(state.db);
    let customers = service
        .list(
            query.search_term.as_deref(),
            parse_active_filter(query.filter.as_deref()),
        )
        .await?;
    Ok(Json(customers))
}

/// Get a customer with their recent orders
pub async fn get_customer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<CustomerWithOrders>> {
    let service = CustomerService::new(state.db);
    let customer = service.get_with_orders(customer_id).await?;
    Ok(Json(customer))
}

/// Create a customer
pub async fn create_customer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateCustomerInput>,
) -> AppResult<Json<Customer>> {
    if !user.has_permission(Permission::ManageCustomers) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = CustomerService::new(state.db);
    let customer = service.create(input).await?;
    Ok(Json(customer))
}

/// Minimal customer creation for the order form (AJAX)
pub async fn quick_create_customer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<QuickCreateRequest>,
) -> AppResult<Json<QuickCreateResponse>> {
    if !user.has_permission(Permission::ManageCustomers) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = CustomerService::new(state.db);
    let customer = service
        .quick_create(&body.name, body.phone, body.email)
        .await?;

    Ok(Json(QuickCreateResponse {
        success: true,
        message: "Customer added successfully".to_string(),
        customer_id: customer.id,
        customer_name: customer.name,
    }))
}

/// Update a customer
pub async fn update_customer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(customer_id): Path<Uuid>,
    Json(input): Json<UpdateCustomerInput>,
) -> AppResult<Json<Customer>> {
    if !user.has_permission(Permission::ManageCustomers) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = CustomerService::new(state.db);
    let customer = service.update(customer_id, input).await?;
    Ok(Json(customer))
}

/// Delete a customer (blocked while they have orders)
pub async fn delete_customer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    if !user.has_permission(Permission::ManageCustomers) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = CustomerService::new(state.db);
    service.delete(customer_id).await?;
    Ok(Json(()))
}

/// Deactivate a customer instead of deleting them
pub async fn deactivate_customer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    if !user.has_permission(Permission::ManageCustomers) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = CustomerService::new(state.db);
    service.deactivate(customer_id).await?;
    Ok(Json(()))
}
