//! Role management service
//!
//! Roles are flat capability sets. System roles (SuperAdmin, Admin,
//! User) can never be edited or deleted; any role with assigned users
//! is protected from deletion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Permission, RoleFlags};

/// Role service
#[derive(Clone)]
pub struct RoleService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    is_system_role: bool,
    can_manage_users: bool,
    can_manage_roles: bool,
    can_manage_products: bool,
    can_manage_categories: bool,
    can_manage_brands: bool,
    can_manage_customers: bool,
    can_manage_orders: bool,
    can_manage_suppliers: bool,
    can_manage_inventory: bool,
    can_view_reports: bool,
    can_manage_settings: bool,
    user_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Role with its capability set and assigned-user count
#[derive(Debug, Serialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_system_role: bool,
    pub permissions: Vec<String>,
    pub user_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        let flags = RoleFlags {
            can_manage_users: row.can_manage_users,
            can_manage_roles: row.can_manage_roles,
            can_manage_products: row.can_manage_products,
            can_manage_categories: row.can_manage_categories,
            can_manage_brands: row.can_manage_brands,
            can_manage_customers: row.can_manage_customers,
            can_manage_orders: row.can_manage_orders,
            can_manage_suppliers: row.can_manage_suppliers,
            can_manage_inventory: row.can_manage_inventory,
            can_view_reports: row.can_view_reports,
            can_manage_settings: row.can_manage_settings,
        };
        Role {
            id: row.id,
            name: row.name,
            description: row.description,
            is_system_role: row.is_system_role,
            permissions: flags.permission_strings(),
            user_count: row.user_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Member summary for the role detail view
#[derive(Debug, Serialize, FromRow)]
pub struct RoleMember {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
}

/// Role with its assigned users
#[derive(Debug, Serialize)]
pub struct RoleWithMembers {
    #[serde(flatten)]
    pub role: Role,
    pub members: Vec<RoleMember>,
}

/// Input for creating a role
#[derive(Debug, Deserialize)]
pub struct CreateRoleInput {
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<Permission>,
}

/// Input for updating a role
#[derive(Debug, Deserialize)]
pub struct UpdateRoleInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<Permission>>,
}

const ROLE_COLUMNS: &str = r#"
    r.id, r.name, r.description, r.is_system_role,
    r.can_manage_users, r.can_manage_roles, r.can_manage_products,
    r.can_manage_categories, r.can_manage_brands, r.can_manage_customers,
    r.can_manage_orders, r.can_manage_suppliers, r.can_manage_inventory,
    r.can_view_reports, r.can_manage_settings,
    (SELECT COUNT(*) FROM user_roles ur WHERE ur.role_id = r.id) AS user_count,
    r.created_at, r.updated_at
"#;

impl RoleService {
    /// Create a new RoleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List roles, system roles first
    pub async fn list(&self, search_term: Option<&str>) -> AppResult<Vec<Role>> {
        let query = format!(
            r#"
            SELECT {ROLE_COLUMNS}
            FROM roles r
            WHERE ($1::text IS NULL OR r.name ILIKE '%' || $1 || '%'
                   OR COALESCE(r.description, '') ILIKE '%' || $1 || '%')
            ORDER BY r.is_system_role DESC, r.name ASC
            "#
        );

        let rows = sqlx::query_as::<_, RoleRow>(&query)
            .bind(search_term)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Role::from).collect())
    }

    /// Get a role by id
    pub async fn get(&self, role_id: Uuid) -> AppResult<Role> {
        let query = format!(
            r#"
            SELECT {ROLE_COLUMNS}
            FROM roles r
            WHERE r.id = $1
            "#
        );

        let row = sqlx::query_as::<_, RoleRow>(&query)
            .bind(role_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Role".to_string()))?;

        Ok(row.into())
    }

    /// Get a role with its assigned users
    pub async fn get_with_members(&self, role_id: Uuid) -> AppResult<RoleWithMembers> {
        let role = self.get(role_id).await?;

        let members = sqlx::query_as::<_, RoleMember>(
            r#"
            SELECT u.id, u.username, u.email, u.first_name, u.last_name, u.is_active
            FROM users u
            JOIN user_roles ur ON ur.user_id = u.id
            WHERE ur.role_id = $1
            ORDER BY u.last_name ASC, u.first_name ASC
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.db)
        .await?;

        Ok(RoleWithMembers { role, members })
    }

    /// Create a role from a capability set
    pub async fn create(&self, input: CreateRoleInput) -> AppResult<Role> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Role name is required".to_string(),
            });
        }

        let duplicate = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM roles WHERE LOWER(name) = LOWER($1)",
        )
        .bind(input.name.trim())
        .fetch_one(&self.db)
        .await?;
        if duplicate > 0 {
            return Err(AppError::DuplicateEntry("role name".to_string()));
        }

        let flags = RoleFlags::from_permissions(&input.permissions);

        let role_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO roles (
                name, description, is_system_role,
                can_manage_users, can_manage_roles, can_manage_products,
                can_manage_categories, can_manage_brands, can_manage_customers,
                can_manage_orders, can_manage_suppliers, can_manage_inventory,
                can_view_reports, can_manage_settings
            )
            VALUES ($1, $2, FALSE, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(flags.can_manage_users)
        .bind(flags.can_manage_roles)
        .bind(flags.can_manage_products)
        .bind(flags.can_manage_categories)
        .bind(flags.can_manage_brands)
        .bind(flags.can_manage_customers)
        .bind(flags.can_manage_orders)
        .bind(flags.can_manage_suppliers)
        .bind(flags.can_manage_inventory)
        .bind(flags.can_view_reports)
        .bind(flags.can_manage_settings)
        .fetch_one(&self.db)
        .await?;

        self.get(role_id).await
    }

    /// Update a role; system roles are immutable
    pub async fn update(&self, role_id: Uuid, input: UpdateRoleInput) -> AppResult<Role> {
        let existing = self.get(role_id).await?;

        if existing.is_system_role {
            return Err(AppError::Conflict {
                resource: "role".to_string(),
                message: "System roles cannot be edited".to_string(),
            });
        }

        let name = input.name.unwrap_or(existing.name);
        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Role name is required".to_string(),
            });
        }

        let duplicate = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM roles WHERE LOWER(name) = LOWER($1) AND id != $2",
        )
        .bind(name.trim())
        .bind(role_id)
        .fetch_one(&self.db)
        .await?;
        if duplicate > 0 {
            return Err(AppError::DuplicateEntry("role name".to_string()));
        }

        let flags = match input.permissions {
            Some(perms) => RoleFlags::from_permissions(&perms),
            None => {
                let current: Vec<Permission> = existing
                    .permissions
                    .iter()
                    .filter_map(|p| Permission::parse(p))
                    .collect();
                RoleFlags::from_permissions(&current)
            }
        };

        sqlx::query(
            r#"
            UPDATE roles
            SET name = $1, description = $2,
                can_manage_users = $3, can_manage_roles = $4, can_manage_products = $5,
                can_manage_categories = $6, can_manage_brands = $7, can_manage_customers = $8,
                can_manage_orders = $9, can_manage_suppliers = $10, can_manage_inventory = $11,
                can_view_reports = $12, can_manage_settings = $13, updated_at = NOW()
            WHERE id = $14
            "#,
        )
        .bind(name.trim())
        .bind(input.description.or(existing.description))
        .bind(flags.can_manage_users)
        .bind(flags.can_manage_roles)
        .bind(flags.can_manage_products)
        .bind(flags.can_manage_categories)
        .bind(flags.can_manage_brands)
        .bind(flags.can_manage_customers)
        .bind(flags.can_manage_orders)
        .bind(flags.can_manage_suppliers)
        .bind(flags.can_manage_inventory)
        .bind(flags.can_view_reports)
        .bind(flags.can_manage_settings)
        .bind(role_id)
        .execute(&self.db)
        .await?;

        self.get(role_id).await
    }

    /// Delete a role; system roles and roles with assigned users are
    /// protected.
    pub async fn delete(&self, role_id: Uuid) -> AppResult<()> {
        let existing = self.get(role_id).await?;

        if existing.is_system_role {
            return Err(AppError::Conflict {
                resource: "role".to_string(),
                message: "System roles cannot be deleted".to_string(),
            });
        }

        if existing.user_count > 0 {
            return Err(AppError::Conflict {
                resource: "role".to_string(),
                message: format!(
                    "Cannot delete role '{}' because it has {} users assigned. Please reassign users first.",
                    existing.name, existing.user_count
                ),
            });
        }

        sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(role_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Assign a user to a role
    pub async fn add_member(&self, role_id: Uuid, user_id: Uuid) -> AppResult<()> {
        self.get(role_id).await?;
        self.ensure_user(user_id).await?;

        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Remove a user from a role
    pub async fn remove_member(&self, role_id: Uuid, user_id: Uuid) -> AppResult<()> {
        self.get(role_id).await?;
        self.ensure_user(user_id).await?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user_id)
            .bind(role_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn ensure_user(&self, user_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.db)
                .await?;
        if !exists {
            return Err(AppError::NotFound("User".to_string()));
        }
        Ok(())
    }
}
