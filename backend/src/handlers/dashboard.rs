//! HTTP handler for the dashboard summary

use axum::{extract::State, Json};
use shared::models::Permission;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::dashboard::DashboardStats;
use crate::services::DashboardService;
use crate::AppState;

/// Aggregated store statistics
pub async fn get_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<DashboardStats>> {
    if !user.has_permission(Permission::ViewReports) {
        return Err(AppError::InsufficientPermissions);
    }

    let threshold = state.config.dashboard.low_stock_threshold;
    let service = DashboardService::new(state.db);
    let stats = service.stats(threshold).await?;
    Ok(Json(stats))
}
