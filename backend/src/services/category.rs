//! Category management service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Category service
#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

/// Category with the number of products referencing it
#[derive(Debug, Serialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Input for updating a category
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl CategoryService {
    /// Create a new CategoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List categories with product counts
    pub async fn list(&self, search_term: Option<&str>) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.id, c.name, c.description, c.is_active,
                   COUNT(p.id) AS product_count, c.created_at, c.updated_at
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            WHERE ($1::text IS NULL OR c.name ILIKE '%' || $1 || '%')
            GROUP BY c.id
            ORDER BY c.name ASC
            "#,
        )
        .bind(search_term)
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    /// Get a category by id
    pub async fn get(&self, category_id: Uuid) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT c.id, c.name, c.description, c.is_active,
                   COUNT(p.id) AS product_count, c.created_at, c.updated_at
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            WHERE c.id = $1
            GROUP BY c.id
            "#,
        )
        .bind(category_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))
    }

    /// Create a category
    pub async fn create(&self, input: CreateCategoryInput) -> AppResult<Category> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Category name is required".to_string(),
            });
        }

        let category_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO categories (name, description, is_active)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.is_active.unwrap_or(true))
        .fetch_one(&self.db)
        .await?;

        self.get(category_id).await
    }

    /// Update a category
    pub async fn update(
        &self,
        category_id: Uuid,
        input: UpdateCategoryInput,
    ) -> AppResult<Category> {
        let existing = self.get(category_id).await?;

        let name = input.name.unwrap_or(existing.name);
        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Category name is required".to_string(),
            });
        }

        sqlx::query(
            r#"
            UPDATE categories
            SET name = $1, description = $2, is_active = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(name.trim())
        .bind(input.description.or(existing.description))
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(category_id)
        .execute(&self.db)
        .await?;

        self.get(category_id).await
    }

    /// Hard delete, blocked while any product references the category
    pub async fn delete(&self, category_id: Uuid) -> AppResult<()> {
        let existing = self.get(category_id).await?;

        if existing.product_count > 0 {
            return Err(AppError::Conflict {
                resource: "category".to_string(),
                message:
                    "Cannot delete category that contains products. Please reassign or delete the products first."
                        .to_string(),
            });
        }

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
