//! Brand management service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Brand service
#[derive(Clone)]
pub struct BrandService {
    db: PgPool,
}

/// Brand with the number of products referencing it
#[derive(Debug, Serialize, FromRow)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a brand
#[derive(Debug, Deserialize)]
pub struct CreateBrandInput {
    pub name: String,
    pub is_active: Option<bool>,
}

/// Input for updating a brand
#[derive(Debug, Deserialize)]
pub struct UpdateBrandInput {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

impl BrandService {
    /// Create a new BrandService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List brands with product counts
    pub async fn list(&self, search_term: Option<&str>) -> AppResult<Vec<Brand>> {
        let brands = sqlx::query_as::<_, Brand>(
            r#"
            SELECT b.id, b.name, b.is_active, COUNT(p.id) AS product_count,
                   b.created_at, b.updated_at
            FROM brands b
            LEFT JOIN products p ON p.brand_id = b.id
            WHERE ($1::text IS NULL OR b.name ILIKE '%' || $1 || '%')
            GROUP BY b.id
            ORDER BY b.name ASC
            "#,
        )
        .bind(search_term)
        .fetch_all(&self.db)
        .await?;

        Ok(brands)
    }

    /// Get a brand by id
    pub async fn get(&self, brand_id: Uuid) -> AppResult<Brand> {
        sqlx::query_as::<_, Brand>(
            r#"
            SELECT b.id, b.name, b.is_active, COUNT(p.id) AS product_count,
                   b.created_at, b.updated_at
            FROM brands b
            LEFT JOIN products p ON p.brand_id = b.id
            WHERE b.id = $1
            GROUP BY b.id
            "#,
        )
        .bind(brand_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Brand".to_string()))
    }

    /// Create a brand
    pub async fn create(&self, input: CreateBrandInput) -> AppResult<Brand> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Brand name is required".to_string(),
            });
        }

        let brand_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO brands (name, is_active) VALUES ($1, $2) RETURNING id",
        )
        .bind(input.name.trim())
        .bind(input.is_active.unwrap_or(true))
        .fetch_one(&self.db)
        .await?;

        self.get(brand_id).await
    }

    /// Update a brand
    pub async fn update(&self, brand_id: Uuid, input: UpdateBrandInput) -> AppResult<Brand> {
        let existing = self.get(brand_id).await?;

        let name = input.name.unwrap_or(existing.name);
        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Brand name is required".to_string(),
            });
        }

        sqlx::query(
            "UPDATE brands SET name = $1, is_active = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(name.trim())
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(brand_id)
        .execute(&self.db)
        .await?;

        self.get(brand_id).await
    }

    /// Hard delete, blocked while any product references the brand
    pub async fn delete(&self, brand_id: Uuid) -> AppResult<()> {
        let existing = self.get(brand_id).await?;

        if existing.product_count > 0 {
            return Err(AppError::Conflict {
                resource: "brand".to_string(),
                message:
                    "Cannot delete brand that contains products. Please reassign or delete the products first."
                        .to_string(),
            });
        }

        sqlx::query("DELETE FROM brands WHERE id = $1")
            .bind(brand_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
