//! Customer management service
//!
//! Customers carry denormalized order statistics (total_orders,
//! total_spent, last_purchase_date). Those counters are owned by the
//! order workflow; nothing here touches them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Customer service
#[derive(Clone)]
pub struct CustomerService {
    db: PgPool,
}

/// Customer record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub total_orders: i32,
    pub total_spent: Decimal,
    pub last_purchase_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Summary of an order shown on the customer detail view
#[derive(Debug, Serialize, FromRow)]
pub struct CustomerOrder {
    pub id: Uuid,
    pub order_number: String,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub payment_status: String,
    pub total_amount: Decimal,
}

/// Customer with their most recent orders
#[derive(Debug, Serialize)]
pub struct CustomerWithOrders {
    #[serde(flatten)]
    pub customer: Customer,
    pub recent_orders: Vec<CustomerOrder>,
}

/// Input for creating a customer
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerInput {
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: String,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

/// Input for updating a customer. The denormalized counters are not
/// part of the editable surface.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerInput {
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

impl CustomerService {
    /// Create a new CustomerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List customers. `active` of None means all; search covers name,
    /// email and phone. Most recent purchasers first.
    pub async fn list(
        &self,
        search_term: Option<&str>,
        active: Option<bool>,
    ) -> AppResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, address, city, country, postal_code, notes,
                   is_active, total_orders, total_spent, last_purchase_date,
                   created_at, updated_at
            FROM customers
            WHERE ($1::bool IS NULL OR is_active = $1)
              AND ($2::text IS NULL
                   OR name ILIKE '%' || $2 || '%'
                   OR COALESCE(email, '') ILIKE '%' || $2 || '%'
                   OR COALESCE(phone, '') ILIKE '%' || $2 || '%')
            ORDER BY last_purchase_date DESC NULLS LAST, name ASC
            "#,
        )
        .bind(active)
        .bind(search_term)
        .fetch_all(&self.db)
        .await?;

        Ok(customers)
    }

    /// Get a customer by id
    pub async fn get(&self, customer_id: Uuid) -> AppResult<Customer> {
        sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, address, city, country, postal_code, notes,
                   is_active, total_orders, total_spent, last_purchase_date,
                   created_at, updated_at
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))
    }

    /// Get a customer together with their 10 most recent orders
    pub async fn get_with_orders(&self, customer_id: Uuid) -> AppResult<CustomerWithOrders> {
        let customer = self.get(customer_id).await?;

        let recent_orders = sqlx::query_as::<_, CustomerOrder>(
            r#"
            SELECT id, order_number, order_date, status, payment_status, total_amount
            FROM orders
            WHERE customer_id = $1
            ORDER BY order_date DESC
            LIMIT 10
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.db)
        .await?;

        Ok(CustomerWithOrders {
            customer,
            recent_orders,
        })
    }

    /// Create a customer; statistics start at zero
    pub async fn create(&self, input: CreateCustomerInput) -> AppResult<Customer> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let customer_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO customers (name, phone, email, address, city, country,
                                   postal_code, notes, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.country)
        .bind(&input.postal_code)
        .bind(&input.notes)
        .bind(input.is_active.unwrap_or(true))
        .fetch_one(&self.db)
        .await?;

        self.get(customer_id).await
    }

    /// Minimal creation path for the order form: name, phone, email.
    pub async fn quick_create(
        &self,
        name: &str,
        phone: Option<String>,
        email: Option<String>,
    ) -> AppResult<Customer> {
        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
            });
        }

        let customer_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO customers (name, phone, email, is_active)
            VALUES ($1, $2, $3, TRUE)
            RETURNING id
            "#,
        )
        .bind(name.trim())
        .bind(&phone)
        .bind(&email)
        .fetch_one(&self.db)
        .await?;

        self.get(customer_id).await
    }

    /// Update a customer's contact fields
    pub async fn update(&self, customer_id: Uuid, input: UpdateCustomerInput) -> AppResult<Customer> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let existing = self.get(customer_id).await?;

        sqlx::query(
            r#"
            UPDATE customers
            SET name = $1, phone = $2, email = $3, address = $4, city = $5,
                country = $6, postal_code = $7, notes = $8, is_active = $9,
                updated_at = NOW()
            WHERE id = $10
            "#,
        )
        .bind(input.name.unwrap_or(existing.name).trim())
        .bind(input.phone.or(existing.phone))
        .bind(input.email.or(existing.email))
        .bind(input.address.or(existing.address))
        .bind(input.city.or(existing.city))
        .bind(input.country.or(existing.country))
        .bind(input.postal_code.or(existing.postal_code))
        .bind(input.notes.or(existing.notes))
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(customer_id)
        .execute(&self.db)
        .await?;

        self.get(customer_id).await
    }

    /// Hard delete, blocked while the customer has any orders
    pub async fn delete(&self, customer_id: Uuid) -> AppResult<()> {
        self.get(customer_id).await?;

        let order_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE customer_id = $1")
                .bind(customer_id)
                .fetch_one(&self.db)
                .await?;

        if order_count > 0 {
            return Err(AppError::Conflict {
                resource: "customer".to_string(),
                message: "Cannot delete customer that has orders. Please delete the orders first."
                    .to_string(),
            });
        }

        sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(customer_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Soft alternative to deletion
    pub async fn deactivate(&self, customer_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE customers SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(customer_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Customer".to_string()));
        }

        Ok(())
    }
}
