//! Product catalog service: search, sort, soft delete, restock and the
//! low-stock lookup

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::validation::{validate_non_negative_amount, validate_positive_quantity};

/// Product service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Product with category/brand/supplier names joined in
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub category_id: Uuid,
    pub category_name: String,
    pub brand_id: Uuid,
    pub brand_name: String,
    pub supplier_id: Option<Uuid>,
    pub supplier_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub category_id: Uuid,
    pub brand_id: Uuid,
    pub supplier_id: Option<Uuid>,
}

/// Input for updating a product
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
}

/// Sort orders accepted by the product listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    Name,
    NameDesc,
    Price,
    PriceDesc,
    Stock,
    StockDesc,
}

impl ProductSort {
    fn order_clause(self) -> &'static str {
        match self {
            ProductSort::Name => "p.name ASC",
            ProductSort::NameDesc => "p.name DESC",
            ProductSort::Price => "p.price ASC",
            ProductSort::PriceDesc => "p.price DESC",
            ProductSort::Stock => "p.stock_quantity ASC",
            ProductSort::StockDesc => "p.stock_quantity DESC",
        }
    }
}

const PRODUCT_COLUMNS: &str = r#"
    p.id, p.name, p.description, p.price, p.stock_quantity, p.image_url, p.is_active,
    p.category_id, c.name AS category_name,
    p.brand_id, b.name AS brand_name,
    p.supplier_id, s.name AS supplier_name,
    p.created_at, p.updated_at
"#;

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List products, optionally filtered by a search term over name and
    /// description, in the requested sort order.
    pub async fn list(
        &self,
        search_term: Option<&str>,
        sort: Option<ProductSort>,
    ) -> AppResult<Vec<Product>> {
        let order = sort.unwrap_or(ProductSort::Name).order_clause();
        let query = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p
            JOIN categories c ON c.id = p.category_id
            JOIN brands b ON b.id = p.brand_id
            LEFT JOIN suppliers s ON s.id = p.supplier_id
            WHERE ($1::text IS NULL OR p.name ILIKE '%' || $1 || '%'
                   OR COALESCE(p.description, '') ILIKE '%' || $1 || '%')
            ORDER BY {order}
            "#
        );

        let products = sqlx::query_as::<_, Product>(&query)
            .bind(search_term)
            .fetch_all(&self.db)
            .await?;

        Ok(products)
    }

    /// Get a product by id with its category/brand/supplier names
    pub async fn get(&self, product_id: Uuid) -> AppResult<Product> {
        let query = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p
            JOIN categories c ON c.id = p.category_id
            JOIN brands b ON b.id = p.brand_id
            LEFT JOIN suppliers s ON s.id = p.supplier_id
            WHERE p.id = $1
            "#
        );

        sqlx::query_as::<_, Product>(&query)
            .bind(product_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Active products at or below the given stock threshold, lowest first
    pub async fn low_stock(&self, threshold: i32) -> AppResult<Vec<Product>> {
        let query = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p
            JOIN categories c ON c.id = p.category_id
            JOIN brands b ON b.id = p.brand_id
            LEFT JOIN suppliers s ON s.id = p.supplier_id
            WHERE p.stock_quantity <= $1 AND p.is_active
            ORDER BY p.stock_quantity ASC
            "#
        );

        let products = sqlx::query_as::<_, Product>(&query)
            .bind(threshold)
            .fetch_all(&self.db)
            .await?;

        Ok(products)
    }

    /// Create a product
    pub async fn create(&self, input: CreateProductInput) -> AppResult<Product> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Product name is required".to_string(),
            });
        }
        validate_non_negative_amount(input.price).map_err(|msg| AppError::Validation {
            field: "price".to_string(),
            message: msg.to_string(),
        })?;
        if input.stock_quantity < 0 {
            return Err(AppError::Validation {
                field: "stock_quantity".to_string(),
                message: "Stock quantity cannot be negative".to_string(),
            });
        }

        self.ensure_category(input.category_id).await?;
        self.ensure_brand(input.brand_id).await?;
        if let Some(supplier_id) = input.supplier_id {
            self.ensure_supplier(supplier_id).await?;
        }

        let product_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO products (name, description, price, stock_quantity, image_url,
                                  is_active, category_id, brand_id, supplier_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock_quantity)
        .bind(&input.image_url)
        .bind(input.is_active.unwrap_or(true))
        .bind(input.category_id)
        .bind(input.brand_id)
        .bind(input.supplier_id)
        .fetch_one(&self.db)
        .await?;

        self.get(product_id).await
    }

    /// Update a product
    pub async fn update(&self, product_id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        let existing = self.get(product_id).await?;

        let name = input.name.unwrap_or(existing.name);
        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Product name is required".to_string(),
            });
        }
        let price = input.price.unwrap_or(existing.price);
        validate_non_negative_amount(price).map_err(|msg| AppError::Validation {
            field: "price".to_string(),
            message: msg.to_string(),
        })?;

        let category_id = input.category_id.unwrap_or(existing.category_id);
        let brand_id = input.brand_id.unwrap_or(existing.brand_id);
        let supplier_id = input.supplier_id.or(existing.supplier_id);
        self.ensure_category(category_id).await?;
        self.ensure_brand(brand_id).await?;
        if let Some(sid) = supplier_id {
            self.ensure_supplier(sid).await?;
        }

        sqlx::query(
            r#"
            UPDATE products
            SET name = $1, description = $2, price = $3, stock_quantity = $4,
                image_url = $5, is_active = $6, category_id = $7, brand_id = $8,
                supplier_id = $9, updated_at = NOW()
            WHERE id = $10
            "#,
        )
        .bind(name.trim())
        .bind(input.description.or(existing.description))
        .bind(price)
        .bind(input.stock_quantity.unwrap_or(existing.stock_quantity))
        .bind(input.image_url.or(existing.image_url))
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(category_id)
        .bind(brand_id)
        .bind(supplier_id)
        .bind(product_id)
        .execute(&self.db)
        .await?;

        self.get(product_id).await
    }

    /// Soft delete: products are deactivated, never removed.
    pub async fn deactivate(&self, product_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE products SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(product_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }

    /// Add a positive quantity to the product's stock
    pub async fn restock(&self, product_id: Uuid, quantity: i32) -> AppResult<Product> {
        validate_positive_quantity(quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(quantity)
        .bind(product_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        self.get(product_id).await
    }

    async fn ensure_category(&self, category_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)",
        )
        .bind(category_id)
        .fetch_one(&self.db)
        .await?;
        if !exists {
            return Err(AppError::NotFound("Category".to_string()));
        }
        Ok(())
    }

    async fn ensure_brand(&self, brand_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM brands WHERE id = $1)")
                .bind(brand_id)
                .fetch_one(&self.db)
                .await?;
        if !exists {
            return Err(AppError::NotFound("Brand".to_string()));
        }
        Ok(())
    }

    async fn ensure_supplier(&self, supplier_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)")
                .bind(supplier_id)
                .fetch_one(&self.db)
                .await?;
        if !exists {
            return Err(AppError::NotFound("Supplier".to_string()));
        }
        Ok(())
    }
}
