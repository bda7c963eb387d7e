//! Dashboard service aggregating counts and sums across the store

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppResult;
use shared::models::OrderStatus;

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

/// Low-stock product line on the dashboard
#[derive(Debug, Serialize, FromRow)]
pub struct LowStockProduct {
    pub id: Uuid,
    pub name: String,
    pub stock_quantity: i32,
    pub category_name: String,
    pub brand_name: String,
}

/// Recent order line on the dashboard
#[derive(Debug, Serialize, FromRow)]
pub struct RecentOrder {
    pub id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub total_amount: Decimal,
}

/// Aggregated store statistics
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_customers: i64,
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub pending_orders: i64,
    pub low_stock_count: i64,
    pub low_stock_products: Vec<LowStockProduct>,
    pub recent_orders: Vec<RecentOrder>,
}

impl DashboardService {
    /// Create a new DashboardService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Collect the dashboard statistics. Revenue sums Completed orders;
    /// the pending count covers Pending and Processing.
    pub async fn stats(&self, low_stock_threshold: i32) -> AppResult<DashboardStats> {
        let total_products =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
                .fetch_one(&self.db)
                .await?;

        let total_customers =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers")
                .fetch_one(&self.db)
                .await?;

        let total_orders = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.db)
            .await?;

        let total_revenue = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(total_amount), 0) FROM orders WHERE status = $1",
        )
        .bind(OrderStatus::Completed.as_str())
        .fetch_one(&self.db)
        .await?;

        let pending_orders = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE status = $1 OR status = $2",
        )
        .bind(OrderStatus::Pending.as_str())
        .bind(OrderStatus::Processing.as_str())
        .fetch_one(&self.db)
        .await?;

        let low_stock_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE stock_quantity <= $1",
        )
        .bind(low_stock_threshold)
        .fetch_one(&self.db)
        .await?;

        let low_stock_products = sqlx::query_as::<_, LowStockProduct>(
            r#"
            SELECT p.id, p.name, p.stock_quantity,
                   c.name AS category_name, b.name AS brand_name
            FROM products p
            JOIN categories c ON c.id = p.category_id
            JOIN brands b ON b.id = p.brand_id
            WHERE p.stock_quantity <= $1
            ORDER BY p.stock_quantity ASC
            LIMIT 10
            "#,
        )
        .bind(low_stock_threshold)
        .fetch_all(&self.db)
        .await?;

        let recent_orders = sqlx::query_as::<_, RecentOrder>(
            r#"
            SELECT o.id, o.order_number, c.name AS customer_name, o.order_date,
                   o.status, o.total_amount
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            ORDER BY o.order_date DESC
            LIMIT 5
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(DashboardStats {
            total_products,
            total_customers,
            total_orders,
            total_revenue,
            pending_orders,
            low_stock_count,
            low_stock_products,
            recent_orders,
        })
    }
}
