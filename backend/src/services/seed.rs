//! Startup seeding of roles and the default administrator
//!
//! The role catalog is declarative data in the shared crate; this module
//! only inserts what is missing, so repeated startups are no-ops.

use bcrypt::{hash, DEFAULT_COST};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{RoleFlags, SEED_ADMIN, SEED_ROLES};

/// Insert the seed roles and the default admin account if absent.
pub async fn run(db: &PgPool) -> AppResult<()> {
    for seed in SEED_ROLES.iter() {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM roles WHERE name = $1)",
        )
        .bind(seed.name)
        .fetch_one(db)
        .await?;

        if exists {
            continue;
        }

        let flags = RoleFlags::from_permissions(seed.permissions);
        sqlx::query(
            r#"
            INSERT INTO roles (
                name, description, is_system_role,
                can_manage_users, can_manage_roles, can_manage_products,
                can_manage_categories, can_manage_brands, can_manage_customers,
                can_manage_orders, can_manage_suppliers, can_manage_inventory,
                can_view_reports, can_manage_settings
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(seed.name)
        .bind(seed.description)
        .bind(seed.is_system_role)
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
        .execute(db)
        .await?;

        tracing::info!("Seeded role {}", seed.name);
    }

    seed_admin(db).await
}

async fn seed_admin(db: &PgPool) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))",
    )
    .bind(SEED_ADMIN.email)
    .fetch_one(db)
    .await?;

    if exists {
        return Ok(());
    }

    let password_hash = hash(SEED_ADMIN.password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

    let mut tx = db.begin().await?;

    let user_id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO users (email, username, password_hash, first_name, last_name, force_password_change)
        VALUES ($1, $2, $3, $4, $5, TRUE)
        RETURNING id
        "#,
    )
    .bind(SEED_ADMIN.email)
    .bind(SEED_ADMIN.username)
    .bind(&password_hash)
    .bind(SEED_ADMIN.first_name)
    .bind(SEED_ADMIN.last_name)
    .fetch_one(&mut *tx)
    .await?;

    let role_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM roles WHERE name = $1")
        .bind(SEED_ADMIN.role)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(role_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("Seeded default admin account {}", SEED_ADMIN.email);
    Ok(())
}
