//! User administration service

use bcrypt::{hash, DEFAULT_COST};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::validation::validate_password_strength;

/// User administration service
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    employee_id: Option<String>,
    department: Option<String>,
    position: Option<String>,
    is_active: bool,
    force_password_change: bool,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// User with the names of their assigned roles
#[derive(Debug, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub employee_id: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub is_active: bool,
    pub force_password_change: bool,
    pub roles: Vec<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    fn from_row(row: UserRow, roles: Vec<String>) -> Self {
        User {
            id: row.id,
            email: row.email,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            employee_id: row.employee_id,
            department: row.department,
            position: row.position,
            is_active: row.is_active,
            force_password_change: row.force_password_change,
            roles,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a user account
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 3, max = 100, message = "Username must be 3-100 characters"))]
    pub username: String,
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    pub phone: Option<String>,
    pub employee_id: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub role_ids: Vec<Uuid>,
    pub force_password_change: Option<bool>,
}

/// Input for editing a user account. A provided role_ids replaces the
/// whole assignment set.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub employee_id: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub role_ids: Option<Vec<Uuid>>,
}

const USER_COLUMNS: &str = r#"
    id, email, username, first_name, last_name, phone, employee_id, department,
    position, is_active, force_password_change, last_login_at, created_at, updated_at
"#;

impl UserService {
    /// Create a new UserService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List users with their role names. Search covers name, email,
    /// username and employee id.
    pub async fn list(
        &self,
        search_term: Option<&str>,
        active: Option<bool>,
    ) -> AppResult<Vec<User>> {
        let query = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE ($1::bool IS NULL OR is_active = $1)
              AND ($2::text IS NULL
                   OR first_name ILIKE '%' || $2 || '%'
                   OR last_name ILIKE '%' || $2 || '%'
                   OR email ILIKE '%' || $2 || '%'
                   OR username ILIKE '%' || $2 || '%'
                   OR COALESCE(employee_id, '') ILIKE '%' || $2 || '%')
            ORDER BY last_name ASC, first_name ASC
            "#
        );

        let rows = sqlx::query_as::<_, UserRow>(&query)
            .bind(active)
            .bind(search_term)
            .fetch_all(&self.db)
            .await?;

        let assignments = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            SELECT ur.user_id, r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            ORDER BY r.name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut by_user: HashMap<Uuid, Vec<String>> = HashMap::new();
        for (user_id, role_name) in assignments {
            by_user.entry(user_id).or_default().push(role_name);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let roles = by_user.remove(&row.id).unwrap_or_default();
                User::from_row(row, roles)
            })
            .collect())
    }

    /// Get a user with their role names
    pub async fn get(&self, user_id: Uuid) -> AppResult<User> {
        let query = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            "#
        );

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let roles = self.role_names(user_id).await?;
        Ok(User::from_row(row, roles))
    }

    /// Create a user account and assign the given roles
    pub async fn create(&self, input: CreateUserInput) -> AppResult<User> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        validate_password_strength(&input.password).map_err(|msg| AppError::Validation {
            field: "password".to_string(),
            message: msg.to_string(),
        })?;

        let duplicate = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE LOWER(email) = LOWER($1) OR LOWER(username) = LOWER($2)",
        )
        .bind(&input.email)
        .bind(&input.username)
        .fetch_one(&self.db)
        .await?;
        if duplicate > 0 {
            return Err(AppError::DuplicateEntry("email or username".to_string()));
        }

        self.ensure_roles_exist(&input.role_ids).await?;

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let mut tx = self.db.begin().await?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (email, username, password_hash, first_name, last_name,
                               phone, employee_id, department, position,
                               force_password_change)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&input.email)
        .bind(&input.username)
        .bind(&password_hash)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.phone)
        .bind(&input.employee_id)
        .bind(&input.department)
        .bind(&input.position)
        .bind(input.force_password_change.unwrap_or(true))
        .fetch_one(&mut *tx)
        .await?;

        for role_id in &input.role_ids {
            sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(role_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get(user_id).await
    }

    /// Edit a user account
    pub async fn update(&self, user_id: Uuid, input: UpdateUserInput) -> AppResult<User> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let existing = self.get(user_id).await?;

        if let Some(ref email) = input.email {
            let duplicate = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM users WHERE LOWER(email) = LOWER($1) AND id != $2",
            )
            .bind(email)
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;
            if duplicate > 0 {
                return Err(AppError::DuplicateEntry("email".to_string()));
            }
        }

        if let Some(ref role_ids) = input.role_ids {
            self.ensure_roles_exist(role_ids).await?;
        }

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            UPDATE users
            SET email = $1, first_name = $2, last_name = $3, phone = $4,
                employee_id = $5, department = $6, position = $7, updated_at = NOW()
            WHERE id = $8
            "#,
        )
        .bind(input.email.unwrap_or(existing.email))
        .bind(input.first_name.unwrap_or(existing.first_name))
        .bind(input.last_name.unwrap_or(existing.last_name))
        .bind(input.phone.or(existing.phone))
        .bind(input.employee_id.or(existing.employee_id))
        .bind(input.department.or(existing.department))
        .bind(input.position.or(existing.position))
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if let Some(role_ids) = input.role_ids {
            sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;

            for role_id in &role_ids {
                sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
                    .bind(user_id)
                    .bind(role_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        self.get(user_id).await
    }

    /// Remove a user account; role assignments cascade
    pub async fn delete(&self, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }

        Ok(())
    }

    /// Administrative password reset; the user must change it on next login
    pub async fn reset_password(&self, user_id: Uuid, new_password: &str) -> AppResult<()> {
        validate_password_strength(new_password).map_err(|msg| AppError::Validation {
            field: "new_password".to_string(),
            message: msg.to_string(),
        })?;

        let new_hash = hash(new_password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $1, force_password_change = TRUE, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(&new_hash)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }

        Ok(())
    }

    /// Deactivate a user account
    pub async fn deactivate(&self, user_id: Uuid) -> AppResult<()> {
        self.set_active(user_id, false).await
    }

    /// Reactivate a user account
    pub async fn activate(&self, user_id: Uuid) -> AppResult<()> {
        self.set_active(user_id, true).await
    }

    async fn set_active(&self, user_id: Uuid, active: bool) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET is_active = $1, updated_at = NOW() WHERE id = $2")
                .bind(active)
                .bind(user_id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }

        Ok(())
    }

    async fn role_names(&self, user_id: Uuid) -> AppResult<Vec<String>> {
        let roles = sqlx::query_scalar::<_, String>(
            r#"
            SELECT r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(roles)
    }

    async fn ensure_roles_exist(&self, role_ids: &[Uuid]) -> AppResult<()> {
        if role_ids.is_empty() {
            return Ok(());
        }

        let valid_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM roles WHERE id = ANY($1)")
                .bind(role_ids)
                .fetch_one(&self.db)
                .await?;

        if valid_count != role_ids.len() as i64 {
            return Err(AppError::Validation {
                field: "role_ids".to_string(),
                message: "One or more role IDs are invalid".to_string(),
            });
        }

        Ok(())
    }
}
