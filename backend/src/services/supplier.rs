//! Supplier management service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Supplier service
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

/// Supplier with aggregate statistics over its products and
/// stock transactions
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub tax_number: Option<String>,
    pub payment_terms: Option<String>,
    pub credit_limit: Decimal,
    pub balance: Decimal,
    pub is_active: bool,
    pub notes: Option<String>,
    pub product_count: i64,
    pub transaction_count: i64,
    pub total_purchases: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product summary listed on the supplier detail view
#[derive(Debug, Serialize, FromRow)]
pub struct SupplierProduct {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub is_active: bool,
}

/// Transaction summary listed on the supplier detail view
#[derive(Debug, Serialize, FromRow)]
pub struct SupplierTransaction {
    pub id: Uuid,
    pub product_name: String,
    pub transaction_type: String,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub transaction_date: DateTime<Utc>,
    pub reference_number: Option<String>,
}

/// Supplier with its products and recent transactions
#[derive(Debug, Serialize)]
pub struct SupplierWithDetails {
    #[serde(flatten)]
    pub supplier: Supplier,
    pub products: Vec<SupplierProduct>,
    pub recent_transactions: Vec<SupplierTransaction>,
}

/// Input for creating a supplier
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierInput {
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub tax_number: Option<String>,
    pub payment_terms: Option<String>,
    pub credit_limit: Option<Decimal>,
    pub balance: Option<Decimal>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

/// Input for updating a supplier
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSupplierInput {
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub tax_number: Option<String>,
    pub payment_terms: Option<String>,
    pub credit_limit: Option<Decimal>,
    pub balance: Option<Decimal>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

const SUPPLIER_COLUMNS: &str = r#"
    s.id, s.name, s.contact_person, s.phone, s.email, s.website, s.address,
    s.city, s.country, s.postal_code, s.tax_number, s.payment_terms,
    s.credit_limit, s.balance, s.is_active, s.notes,
    (SELECT COUNT(*) FROM products p WHERE p.supplier_id = s.id) AS product_count,
    (SELECT COUNT(*) FROM stock_transactions st WHERE st.supplier_id = s.id) AS transaction_count,
    COALESCE((SELECT SUM(st.quantity * st.unit_cost)
              FROM stock_transactions st WHERE st.supplier_id = s.id), 0) AS total_purchases,
    s.created_at, s.updated_at
"#;

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List suppliers with aggregate statistics, alphabetically
    pub async fn list(
        &self,
        search_term: Option<&str>,
        active: Option<bool>,
    ) -> AppResult<Vec<Supplier>> {
        let query = format!(
            r#"
            SELECT {SUPPLIER_COLUMNS}
            FROM suppliers s
            WHERE ($1::bool IS NULL OR s.is_active = $1)
              AND ($2::text IS NULL
                   OR s.name ILIKE '%' || $2 || '%'
                   OR COALESCE(s.contact_person, '') ILIKE '%' || $2 || '%'
                   OR COALESCE(s.phone, '') ILIKE '%' || $2 || '%'
                   OR COALESCE(s.email, '') ILIKE '%' || $2 || '%')
            ORDER BY s.name ASC
            "#
        );

        let suppliers = sqlx::query_as::<_, Supplier>(&query)
            .bind(active)
            .bind(search_term)
            .fetch_all(&self.db)
            .await?;

        Ok(suppliers)
    }

    /// Get a supplier by id
    pub async fn get(&self, supplier_id: Uuid) -> AppResult<Supplier> {
        let query = format!(
            r#"
            SELECT {SUPPLIER_COLUMNS}
            FROM suppliers s
            WHERE s.id = $1
            "#
        );

        sqlx::query_as::<_, Supplier>(&query)
            .bind(supplier_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    /// Get a supplier with its products and 10 most recent transactions
    pub async fn get_with_details(&self, supplier_id: Uuid) -> AppResult<SupplierWithDetails> {
        let supplier = self.get(supplier_id).await?;

        let products = sqlx::query_as::<_, SupplierProduct>(
            r#"
            SELECT id, name, price, stock_quantity, is_active
            FROM products
            WHERE supplier_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(supplier_id)
        .fetch_all(&self.db)
        .await?;

        let recent_transactions = sqlx::query_as::<_, SupplierTransaction>(
            r#"
            SELECT st.id, p.name AS product_name, st.transaction_type, st.quantity,
                   st.unit_cost, st.transaction_date, st.reference_number
            FROM stock_transactions st
            JOIN products p ON p.id = st.product_id
            WHERE st.supplier_id = $1
            ORDER BY st.transaction_date DESC
            LIMIT 10
            "#,
        )
        .bind(supplier_id)
        .fetch_all(&self.db)
        .await?;

        Ok(SupplierWithDetails {
            supplier,
            products,
            recent_transactions,
        })
    }

    /// Create a supplier
    pub async fn create(&self, input: CreateSupplierInput) -> AppResult<Supplier> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let supplier_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO suppliers (name, contact_person, phone, email, website, address,
                                   city, country, postal_code, tax_number, payment_terms,
                                   credit_limit, balance, is_active, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.website)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.country)
        .bind(&input.postal_code)
        .bind(&input.tax_number)
        .bind(&input.payment_terms)
        .bind(input.credit_limit.unwrap_or(Decimal::ZERO))
        .bind(input.balance.unwrap_or(Decimal::ZERO))
        .bind(input.is_active.unwrap_or(true))
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        self.get(supplier_id).await
    }

    /// Update a supplier
    pub async fn update(&self, supplier_id: Uuid, input: UpdateSupplierInput) -> AppResult<Supplier> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let existing = self.get(supplier_id).await?;

        sqlx::query(
            r#"
            UPDATE suppliers
            SET name = $1, contact_person = $2, phone = $3, email = $4, website = $5,
                address = $6, city = $7, country = $8, postal_code = $9, tax_number = $10,
                payment_terms = $11, credit_limit = $12, balance = $13, is_active = $14,
                notes = $15, updated_at = NOW()
            WHERE id = $16
            "#,
        )
        .bind(input.name.unwrap_or(existing.name).trim())
        .bind(input.contact_person.or(existing.contact_person))
        .bind(input.phone.or(existing.phone))
        .bind(input.email.or(existing.email))
        .bind(input.website.or(existing.website))
        .bind(input.address.or(existing.address))
        .bind(input.city.or(existing.city))
        .bind(input.country.or(existing.country))
        .bind(input.postal_code.or(existing.postal_code))
        .bind(input.tax_number.or(existing.tax_number))
        .bind(input.payment_terms.or(existing.payment_terms))
        .bind(input.credit_limit.unwrap_or(existing.credit_limit))
        .bind(input.balance.unwrap_or(existing.balance))
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(input.notes.or(existing.notes))
        .bind(supplier_id)
        .execute(&self.db)
        .await?;

        self.get(supplier_id).await
    }

    /// Hard delete, blocked while the supplier has associated products
    pub async fn delete(&self, supplier_id: Uuid) -> AppResult<()> {
        let existing = self.get(supplier_id).await?;

        if existing.product_count > 0 {
            return Err(AppError::Conflict {
                resource: "supplier".to_string(),
                message:
                    "Cannot delete supplier that has associated products. Please reassign or delete the products first."
                        .to_string(),
            });
        }

        sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(supplier_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
