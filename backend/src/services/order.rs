//! Order management service and the status-driven stock workflow
//!
//! Stock moves when an order crosses the Completed boundary: deducted on
//! the way in, restored on the way out (including deletion). Customer
//! statistics are maintained on create and delete only; the edit path
//! deliberately leaves them alone. Every mutation here runs inside one
//! database transaction so stock, counters and the order row commit
//! together.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{
    generate_order_number, line_total, stock_adjustment, OrderStatus, PaymentStatus,
    StockAdjustment,
};
use shared::validation::{validate_discount_percent, validate_positive_quantity};

/// Order service
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// Order with the customer name joined in
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub order_number: String,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub shipping_cost: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub shipped_date: Option<DateTime<Utc>>,
    pub delivered_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    product_name: String,
    quantity: i32,
    unit_price: Decimal,
    discount: Option<Decimal>,
}

/// Order line with its derived total
#[derive(Debug, Serialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Option<Decimal>,
    pub total_price: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        let total_price = line_total(row.quantity, row.unit_price, row.discount);
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
            discount: row.discount,
            total_price,
        }
    }
}

/// Order with its line items
#[derive(Debug, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Listing filters
#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub search_term: Option<String>,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub customer_id: Option<Uuid>,
}

/// One line of a new order
#[derive(Debug, Deserialize)]
pub struct CreateOrderItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Option<Decimal>,
}

/// Input for creating an order. `total_amount` is taken as supplied by
/// the caller; it is not recomputed from the lines.
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub customer_id: Uuid,
    pub order_date: Option<DateTime<Utc>>,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<String>,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub shipping_cost: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub items: Vec<CreateOrderItemInput>,
}

/// Input for editing an order. Line items are fixed at creation.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderInput {
    pub customer_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<String>,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub shipping_cost: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub notes: Option<String>,
}

/// Product summary for the order form
#[derive(Debug, Serialize, FromRow)]
pub struct ProductDetails {
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
}

const ORDER_COLUMNS: &str = r#"
    o.id, o.customer_id, c.name AS customer_name, o.order_number, o.order_date,
    o.status, o.payment_status, o.payment_method, o.shipping_address,
    o.billing_address, o.shipping_cost, o.tax_amount, o.discount_amount,
    o.total_amount, o.notes, o.shipped_date, o.delivered_date,
    o.created_at, o.updated_at
"#;

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List orders matching the filter, newest first
    pub async fn list(&self, filter: &OrderFilter) -> AppResult<Vec<Order>> {
        let query = format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE ($1::text IS NULL OR o.order_number ILIKE '%' || $1 || '%'
                   OR c.name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR o.status = $2)
              AND ($3::text IS NULL OR o.payment_status = $3)
              AND ($4::timestamptz IS NULL OR o.order_date >= $4)
              AND ($5::timestamptz IS NULL OR o.order_date <= $5)
              AND ($6::uuid IS NULL OR o.customer_id = $6)
            ORDER BY o.order_date DESC
            "#
        );

        let orders = sqlx::query_as::<_, Order>(&query)
            .bind(filter.search_term.as_deref())
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.payment_status.map(|s| s.as_str()))
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.customer_id)
            .fetch_all(&self.db)
            .await?;

        Ok(orders)
    }

    /// Get an order with its line items
    pub async fn get(&self, order_id: Uuid) -> AppResult<OrderWithItems> {
        let query = format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE o.id = $1
            "#
        );

        let order = sqlx::query_as::<_, Order>(&query)
            .bind(order_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let items = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT id, order_id, product_id, product_name, quantity, unit_price, discount
            FROM order_items
            WHERE order_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(OrderWithItems {
            order,
            items: items.into_iter().map(OrderItem::from).collect(),
        })
    }

    /// Create an order with its line items. Creating directly in the
    /// Completed state deducts stock immediately; the customer's
    /// statistics are incremented exactly once, here.
    pub async fn create(&self, input: CreateOrderInput) -> AppResult<OrderWithItems> {
        for item in &input.items {
            validate_positive_quantity(item.quantity).map_err(|msg| AppError::Validation {
                field: "quantity".to_string(),
                message: msg.to_string(),
            })?;
            if let Some(discount) = item.discount {
                validate_discount_percent(discount).map_err(|msg| AppError::Validation {
                    field: "discount".to_string(),
                    message: msg.to_string(),
                })?;
            }
        }

        let customer_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)")
                .bind(input.customer_id)
                .fetch_one(&self.db)
                .await?;
        if !customer_exists {
            return Err(AppError::NotFound("Customer".to_string()));
        }

        let status = input.status.unwrap_or(OrderStatus::Pending);
        let payment_status = input.payment_status.unwrap_or(PaymentStatus::Pending);
        let order_date = input.order_date.unwrap_or_else(Utc::now);
        let order_number = generate_order_number();

        let mut tx = self.db.begin().await?;

        let order_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO orders (customer_id, order_number, order_date, status,
                                payment_status, payment_method, shipping_address,
                                billing_address, shipping_cost, tax_amount,
                                discount_amount, total_amount, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(input.customer_id)
        .bind(&order_number)
        .bind(order_date)
        .bind(status.as_str())
        .bind(payment_status.as_str())
        .bind(&input.payment_method)
        .bind(&input.shipping_address)
        .bind(&input.billing_address)
        .bind(input.shipping_cost.unwrap_or(Decimal::ZERO))
        .bind(input.tax_amount.unwrap_or(Decimal::ZERO))
        .bind(input.discount_amount.unwrap_or(Decimal::ZERO))
        .bind(input.total_amount)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        for item in &input.items {
            // Snapshot the product name at order time
            let product_name = sqlx::query_scalar::<_, String>(
                "SELECT name FROM products WHERE id = $1",
            )
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, product_name,
                                         quantity, unit_price, discount)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(&product_name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.discount)
            .execute(&mut *tx)
            .await?;
        }

        if status == OrderStatus::Completed {
            Self::apply_stock(&mut tx, order_id, StockAdjustment::Deduct).await?;
        }

        sqlx::query(
            r#"
            UPDATE customers
            SET total_orders = total_orders + 1,
                total_spent = total_spent + $1,
                last_purchase_date = $2,
                updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(input.total_amount)
        .bind(order_date)
        .bind(input.customer_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(order_number = %order_number, "Order created");
        self.get(order_id).await
    }

    /// Edit an order. The before/after status comparison decides the
    /// stock movement; re-saving with an unchanged status moves nothing.
    /// Customer statistics are not recalculated here.
    pub async fn update(&self, order_id: Uuid, input: UpdateOrderInput) -> AppResult<OrderWithItems> {
        let existing = self.get(order_id).await?.order;

        let old_status = OrderStatus::parse(&existing.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown order status {}", existing.status)))?;
        let new_status = input.status.unwrap_or(old_status);

        if let Some(customer_id) = input.customer_id {
            let customer_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)",
            )
            .bind(customer_id)
            .fetch_one(&self.db)
            .await?;
            if !customer_exists {
                return Err(AppError::NotFound("Customer".to_string()));
            }
        }

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            UPDATE orders
            SET customer_id = $1, status = $2, payment_status = $3, payment_method = $4,
                shipping_address = $5, billing_address = $6, shipping_cost = $7,
                tax_amount = $8, discount_amount = $9, total_amount = $10, notes = $11,
                updated_at = NOW()
            WHERE id = $12
            "#,
        )
        .bind(input.customer_id.unwrap_or(existing.customer_id))
        .bind(new_status.as_str())
        .bind(
            input
                .payment_status
                .map(|s| s.as_str().to_string())
                .unwrap_or(existing.payment_status),
        )
        .bind(input.payment_method.or(existing.payment_method))
        .bind(input.shipping_address.or(existing.shipping_address))
        .bind(input.billing_address.or(existing.billing_address))
        .bind(input.shipping_cost.unwrap_or(existing.shipping_cost))
        .bind(input.tax_amount.unwrap_or(existing.tax_amount))
        .bind(input.discount_amount.unwrap_or(existing.discount_amount))
        .bind(input.total_amount.unwrap_or(existing.total_amount))
        .bind(input.notes.or(existing.notes))
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        Self::apply_stock(&mut tx, order_id, stock_adjustment(old_status, new_status)).await?;

        tx.commit().await?;

        self.get(order_id).await
    }

    /// Status-only update used by the order list view
    pub async fn update_status(&self, order_id: Uuid, status: OrderStatus) -> AppResult<()> {
        let existing = self.get(order_id).await?.order;
        let old_status = OrderStatus::parse(&existing.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown order status {}", existing.status)))?;

        let mut tx = self.db.begin().await?;

        sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        Self::apply_stock(&mut tx, order_id, stock_adjustment(old_status, status)).await?;

        tx.commit().await?;

        Ok(())
    }

    /// Delete an order: restore stock if it was Completed, remove the
    /// lines, roll the customer's statistics back, remove the order.
    pub async fn delete(&self, order_id: Uuid) -> AppResult<()> {
        let existing = self.get(order_id).await?.order;
        let status = OrderStatus::parse(&existing.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown order status {}", existing.status)))?;

        let mut tx = self.db.begin().await?;

        if status == OrderStatus::Completed {
            Self::apply_stock(&mut tx, order_id, StockAdjustment::Restore).await?;
        }

        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE customers
            SET total_orders = total_orders - 1,
                total_spent = total_spent - $1,
                updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(existing.total_amount)
        .bind(existing.customer_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(order_number = %existing.order_number, "Order deleted");
        Ok(())
    }

    /// Product summary for the order form (AJAX)
    pub async fn product_details(&self, product_id: Uuid) -> AppResult<ProductDetails> {
        sqlx::query_as::<_, ProductDetails>(
            "SELECT name, price, stock_quantity AS stock FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Apply the stock movement for every line of the order. Quantities
    /// are aggregated per product so an order with two lines of the same
    /// product moves the sum.
    async fn apply_stock(
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        adjustment: StockAdjustment,
    ) -> AppResult<()> {
        let sign = match adjustment {
            StockAdjustment::Unchanged => return Ok(()),
            StockAdjustment::Deduct => -1i32,
            StockAdjustment::Restore => 1i32,
        };

        sqlx::query(
            r#"
            UPDATE products p
            SET stock_quantity = p.stock_quantity + $1 * agg.qty, updated_at = NOW()
            FROM (
                SELECT product_id, SUM(quantity)::int AS qty
                FROM order_items
                WHERE order_id = $2
                GROUP BY product_id
            ) agg
            WHERE p.id = agg.product_id
            "#,
        )
        .bind(sign)
        .bind(order_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
