//! Authentication service for login, token management and the caller's
//! own profile

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use shared::models::RoleFlags;
use shared::validation::validate_password_strength;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub username: String,
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Claims carried by refresh tokens
#[derive(Debug, Serialize, Deserialize)]
struct RefreshClaims {
    sub: String,
    token_type: String,
    exp: i64,
    iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    /// The account was created or reset with a temporary password
    pub force_password_change: bool,
}

/// User row loaded for authentication
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    is_active: bool,
    force_password_change: bool,
}

/// The 11 capability flags of one role row
#[derive(Debug, FromRow)]
struct RoleFlagsRow {
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
}

impl From<RoleFlagsRow> for RoleFlags {
    fn from(row: RoleFlagsRow) -> Self {
        RoleFlags {
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
        }
    }
}

/// Input for self-registration. New accounts get the basic User role.
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

/// The caller's own account details
#[derive(Debug, Serialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub employee_id: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub force_password_change: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Input for updating the caller's profile
#[derive(Debug, Deserialize)]
pub struct UpdateProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Log in with email or username. Inactive accounts are rejected.
    pub async fn login(&self, identifier: &str, password: &str) -> AppResult<AuthTokens> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, is_active, force_password_change
            FROM users
            WHERE LOWER(email) = LOWER($1) OR LOWER(username) = LOWER($1)
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.db)
            .await?;

        let permissions = self.resolve_permissions(user.id).await?;
        self.generate_tokens(user.id, &user.username, permissions, user.force_password_change)
    }

    /// Register a new account. The account is assigned the seeded User
    /// role, which carries no management capabilities until an
    /// administrator grants more.
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthTokens> {
        shared::validation::validate_email(&input.email).map_err(|msg| AppError::Validation {
            field: "email".to_string(),
            message: msg.to_string(),
        })?;
        if input.username.trim().len() < 3 {
            return Err(AppError::Validation {
                field: "username".to_string(),
                message: "Username must be at least 3 characters".to_string(),
            });
        }
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

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let mut tx = self.db.begin().await?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (email, username, password_hash, first_name, last_name, phone)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&input.email)
        .bind(input.username.trim())
        .bind(&password_hash)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.phone)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, id FROM roles WHERE name = $2
            "#,
        )
        .bind(user_id)
        .bind(shared::models::DEFAULT_REGISTRATION_ROLE)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let permissions = self.resolve_permissions(user_id).await?;
        self.generate_tokens(user_id, input.username.trim(), permissions, false)
    }

    /// Exchange a refresh token for a new token pair
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let claims = decode::<RefreshClaims>(
            refresh_token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?
        .claims;

        if claims.token_type != "refresh" {
            return Err(AppError::InvalidToken);
        }

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;

        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, is_active, force_password_change
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidToken)?;

        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        let permissions = self.resolve_permissions(user.id).await?;
        self.generate_tokens(user.id, &user.username, permissions, user.force_password_change)
    }

    /// Get the caller's profile
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, email, username, first_name, last_name, phone, employee_id,
                   department, position, force_password_change, last_login_at, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(profile)
    }

    /// Update the caller's profile
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> AppResult<Profile> {
        let existing = self.get_profile(user_id).await?;

        let first_name = input.first_name.unwrap_or(existing.first_name);
        let last_name = input.last_name.unwrap_or(existing.last_name);
        let phone = input.phone.or(existing.phone);

        sqlx::query(
            r#"
            UPDATE users
            SET first_name = $1, last_name = $2, phone = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(&first_name)
        .bind(&last_name)
        .bind(&phone)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        self.get_profile(user_id).await
    }

    /// Change the caller's password after verifying the current one
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        validate_password_strength(new_password).map_err(|msg| AppError::Validation {
            field: "new_password".to_string(),
            message: msg.to_string(),
        })?;

        let stored_hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let valid = verify(current_password, &stored_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let new_hash = hash(new_password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $1, force_password_change = FALSE, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(&new_hash)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Union the capability flags of every role assigned to the user
    /// into the permission strings carried in the token.
    async fn resolve_permissions(&self, user_id: Uuid) -> AppResult<Vec<String>> {
        let rows = sqlx::query_as::<_, RoleFlagsRow>(
            r#"
            SELECT r.can_manage_users, r.can_manage_roles, r.can_manage_products,
                   r.can_manage_categories, r.can_manage_brands, r.can_manage_customers,
                   r.can_manage_orders, r.can_manage_suppliers, r.can_manage_inventory,
                   r.can_view_reports, r.can_manage_settings
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        let flags = rows
            .into_iter()
            .map(RoleFlags::from)
            .fold(RoleFlags::default(), |acc, f| acc.union(&f));

        Ok(flags.permission_strings())
    }

    fn generate_tokens(
        &self,
        user_id: Uuid,
        username: &str,
        permissions: Vec<String>,
        force_password_change: bool,
    ) -> AppResult<AuthTokens> {
        let now = Utc::now();

        let access_claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            permissions,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
        };

        let refresh_claims = RefreshClaims {
            sub: user_id.to_string(),
            token_type: "refresh".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.refresh_token_expiry)).timestamp(),
        };

        let key = EncodingKey::from_secret(self.jwt_secret.as_bytes());
        let access_token = encode(&Header::default(), &access_claims, &key)
            .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))?;
        let refresh_token = encode(&Header::default(), &refresh_claims, &key)
            .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
            force_password_change,
        })
    }
}
