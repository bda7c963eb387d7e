//! Stock transaction service
//!
//! Every manual stock movement is recorded as its own row and applied to
//! the product's quantity in the same transaction. The arithmetic lives
//! in `shared::models::stock` so the recording and reversal paths cannot
//! drift apart.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{
    delete_effect, generate_bulk_reference, record_effect, StockEffect, TransactionType,
};
use shared::validation::validate_positive_quantity;

/// Stock transaction service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct StockTransactionRow {
    id: Uuid,
    product_id: Uuid,
    product_name: String,
    supplier_id: Option<Uuid>,
    supplier_name: Option<String>,
    transaction_type: String,
    quantity: i32,
    unit_cost: Decimal,
    transaction_date: DateTime<Utc>,
    reference_number: Option<String>,
    reference_type: Option<String>,
    reference_id: Option<Uuid>,
    notes: Option<String>,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
}

/// Stock transaction with its derived total cost
#[derive(Debug, Serialize)]
pub struct StockTransaction {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub supplier_id: Option<Uuid>,
    pub supplier_name: Option<String>,
    pub transaction_type: String,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
    pub transaction_date: DateTime<Utc>,
    pub reference_number: Option<String>,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<StockTransactionRow> for StockTransaction {
    fn from(row: StockTransactionRow) -> Self {
        let total_cost = Decimal::from(row.quantity) * row.unit_cost;
        StockTransaction {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            supplier_id: row.supplier_id,
            supplier_name: row.supplier_name,
            transaction_type: row.transaction_type,
            quantity: row.quantity,
            unit_cost: row.unit_cost,
            total_cost,
            transaction_date: row.transaction_date,
            reference_number: row.reference_number,
            reference_type: row.reference_type,
            reference_id: row.reference_id,
            notes: row.notes,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

/// Listing filters
#[derive(Debug, Default, Deserialize)]
pub struct StockFilter {
    pub search_term: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub product_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
}

/// Input for recording a stock transaction
#[derive(Debug, Deserialize)]
pub struct RecordTransactionInput {
    pub product_id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub transaction_type: TransactionType,
    pub quantity: i32,
    pub unit_cost: Option<Decimal>,
    pub transaction_date: Option<DateTime<Utc>>,
    pub reference_number: Option<String>,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// One line of a bulk purchase
#[derive(Debug, Deserialize)]
pub struct BulkPurchaseItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub notes: Option<String>,
}

/// Outcome of a bulk purchase batch
#[derive(Debug, Serialize)]
pub struct BulkPurchaseOutcome {
    pub reference_number: String,
    pub applied_items: usize,
    pub skipped_items: usize,
}

const TRANSACTION_COLUMNS: &str = r#"
    st.id, st.product_id, p.name AS product_name, st.supplier_id, s.name AS supplier_name,
    st.transaction_type, st.quantity, st.unit_cost, st.transaction_date,
    st.reference_number, st.reference_type, st.reference_id, st.notes,
    st.created_by, st.created_at
"#;

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List transactions matching the filter, newest first
    pub async fn list(&self, filter: &StockFilter) -> AppResult<Vec<StockTransaction>> {
        let query = format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM stock_transactions st
            JOIN products p ON p.id = st.product_id
            LEFT JOIN suppliers s ON s.id = st.supplier_id
            WHERE ($1::text IS NULL
                   OR COALESCE(st.reference_number, '') ILIKE '%' || $1 || '%'
                   OR COALESCE(st.notes, '') ILIKE '%' || $1 || '%'
                   OR p.name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR st.transaction_type = $2)
              AND ($3::timestamptz IS NULL OR st.transaction_date >= $3)
              AND ($4::timestamptz IS NULL OR st.transaction_date <= $4)
              AND ($5::uuid IS NULL OR st.product_id = $5)
              AND ($6::uuid IS NULL OR st.supplier_id = $6)
            ORDER BY st.transaction_date DESC, st.created_at DESC
            "#
        );

        let rows = sqlx::query_as::<_, StockTransactionRow>(&query)
            .bind(filter.search_term.as_deref())
            .bind(filter.transaction_type.map(|t| t.as_str()))
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.product_id)
            .bind(filter.supplier_id)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(StockTransaction::from).collect())
    }

    /// Get a transaction by id
    pub async fn get(&self, transaction_id: Uuid) -> AppResult<StockTransaction> {
        let query = format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM stock_transactions st
            JOIN products p ON p.id = st.product_id
            LEFT JOIN suppliers s ON s.id = st.supplier_id
            WHERE st.id = $1
            "#
        );

        let row = sqlx::query_as::<_, StockTransactionRow>(&query)
            .bind(transaction_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Stock transaction".to_string()))?;

        Ok(row.into())
    }

    /// Record a transaction and apply its stock effect atomically
    pub async fn record(
        &self,
        created_by: Uuid,
        input: RecordTransactionInput,
    ) -> AppResult<StockTransaction> {
        validate_positive_quantity(input.quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;

        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(input.product_id)
                .fetch_one(&self.db)
                .await?;
        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        if let Some(supplier_id) = input.supplier_id {
            let supplier_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)",
            )
            .bind(supplier_id)
            .fetch_one(&self.db)
            .await?;
            if !supplier_exists {
                return Err(AppError::NotFound("Supplier".to_string()));
            }
        }

        let transaction_date = input.transaction_date.unwrap_or_else(Utc::now);

        let mut tx = self.db.begin().await?;

        let transaction_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO stock_transactions (product_id, supplier_id, transaction_type,
                                            quantity, unit_cost, transaction_date,
                                            reference_number, reference_type, reference_id,
                                            notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(input.product_id)
        .bind(input.supplier_id)
        .bind(input.transaction_type.as_str())
        .bind(input.quantity)
        .bind(input.unit_cost.unwrap_or(Decimal::ZERO))
        .bind(transaction_date)
        .bind(&input.reference_number)
        .bind(&input.reference_type)
        .bind(input.reference_id)
        .bind(&input.notes)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        Self::apply_effect(
            &mut tx,
            input.product_id,
            record_effect(input.transaction_type, input.quantity),
        )
        .await?;

        tx.commit().await?;

        self.get(transaction_id).await
    }

    /// Delete a transaction, reversing its original stock effect.
    /// Adjustment and Transfer rows are removed without touching stock.
    pub async fn delete(&self, transaction_id: Uuid) -> AppResult<()> {
        let existing = self.get(transaction_id).await?;
        let kind = TransactionType::parse(&existing.transaction_type).ok_or_else(|| {
            AppError::Internal(format!(
                "Unknown transaction type {}",
                existing.transaction_type
            ))
        })?;

        let mut tx = self.db.begin().await?;

        Self::apply_effect(
            &mut tx,
            existing.product_id,
            delete_effect(kind, existing.quantity),
        )
        .await?;

        sqlx::query("DELETE FROM stock_transactions WHERE id = $1")
            .bind(transaction_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Record a batch of purchase lines under one shared reference
    /// number. Lines are validated and applied independently: a bad line
    /// is skipped and the rest still land.
    pub async fn bulk_purchase(
        &self,
        created_by: Uuid,
        supplier_id: Uuid,
        items: Vec<BulkPurchaseItem>,
    ) -> AppResult<BulkPurchaseOutcome> {
        if items.is_empty() {
            return Err(AppError::ValidationError("No items provided".to_string()));
        }

        let supplier_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)")
                .bind(supplier_id)
                .fetch_one(&self.db)
                .await?;
        if !supplier_exists {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        let reference_number = generate_bulk_reference();
        let mut applied = 0usize;
        let mut skipped = 0usize;

        for item in &items {
            if item.quantity <= 0 || item.unit_cost <= Decimal::ZERO {
                skipped += 1;
                continue;
            }

            let product_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
            )
            .bind(item.product_id)
            .fetch_one(&self.db)
            .await?;
            if !product_exists {
                skipped += 1;
                continue;
            }

            let mut tx = self.db.begin().await?;

            sqlx::query(
                r#"
                INSERT INTO stock_transactions (product_id, supplier_id, transaction_type,
                                                quantity, unit_cost, transaction_date,
                                                reference_number, reference_type, notes,
                                                created_by)
                VALUES ($1, $2, $3, $4, $5, NOW(), $6, 'BulkPurchase', $7, $8)
                "#,
            )
            .bind(item.product_id)
            .bind(supplier_id)
            .bind(TransactionType::Purchase.as_str())
            .bind(item.quantity)
            .bind(item.unit_cost)
            .bind(&reference_number)
            .bind(&item.notes)
            .bind(created_by)
            .execute(&mut *tx)
            .await?;

            Self::apply_effect(
                &mut tx,
                item.product_id,
                record_effect(TransactionType::Purchase, item.quantity),
            )
            .await?;

            // Items commit one by one; a failure mid-batch leaves the
            // earlier lines applied.
            tx.commit().await?;
            applied += 1;
        }

        tracing::info!(
            reference = %reference_number,
            applied,
            skipped,
            "Bulk purchase recorded"
        );

        Ok(BulkPurchaseOutcome {
            reference_number,
            applied_items: applied,
            skipped_items: skipped,
        })
    }

    /// Apply a stock effect to a product inside the caller's transaction
    async fn apply_effect(
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
        effect: StockEffect,
    ) -> AppResult<()> {
        match effect {
            StockEffect::None => Ok(()),
            StockEffect::Add(q) => {
                sqlx::query(
                    "UPDATE products SET stock_quantity = stock_quantity + $1, updated_at = NOW() WHERE id = $2",
                )
                .bind(q)
                .bind(product_id)
                .execute(&mut **tx)
                .await?;
                Ok(())
            }
            StockEffect::Subtract(q) => {
                sqlx::query(
                    "UPDATE products SET stock_quantity = stock_quantity - $1, updated_at = NOW() WHERE id = $2",
                )
                .bind(q)
                .bind(product_id)
                .execute(&mut **tx)
                .await?;
                Ok(())
            }
            StockEffect::Set(q) => {
                sqlx::query(
                    "UPDATE products SET stock_quantity = $1, updated_at = NOW() WHERE id = $2",
                )
                .bind(q)
                .bind(product_id)
                .execute(&mut **tx)
                .await?;
                Ok(())
            }
        }
    }
}
