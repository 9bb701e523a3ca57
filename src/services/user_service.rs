use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::query::{CollectionSpec, Column, ListQuery};
use crate::database::rows;
use crate::error::Result;
use crate::models::user::{User, UserRole};

/// Every column of the users table; used when a handler needs the full row,
/// credentials included.
const USER_COLUMNS: &str = "id, name, email, photo, password, role, password_changed_at, \
     password_reset_token, password_reset_expires, active, created_at, updated_at";

/// List-endpoint view of users. Credential columns and the soft-delete flag
/// are listed so that the query layer knows to treat them as invisible.
pub const USERS_COLLECTION: CollectionSpec = CollectionSpec {
    table: "users",
    columns: &[
        Column::new("id", "id", "uuid"),
        Column::new("name", "name", "text"),
        Column::new("email", "email", "text"),
        Column::new("photo", "photo", "text"),
        Column::new("role", "role::text", "text"),
        Column::new("passwordChangedAt", "password_changed_at", "timestamptz"),
        Column::new("createdAt", "created_at", "timestamptz"),
        Column::new("updatedAt", "updated_at", "timestamptz"),
        Column::new("password", "password", "text"),
        Column::new("passwordResetToken", "password_reset_token", "text"),
        Column::new("passwordResetExpires", "password_reset_expires", "timestamptz"),
        Column::new("active", "active", "bool"),
    ],
    hidden: &[
        "password",
        "password_reset_token",
        "password_reset_expires",
        "active",
    ],
    default_sort: "created_at",
};

/// The active-only predicate applied to every default read path; callers opt
/// out explicitly with `include_inactive`.
const ACTIVE_ONLY: &str = "active = TRUE";

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, params: &HashMap<String, String>) -> Result<Vec<JsonValue>> {
        let query = ListQuery::from_params(params);
        let plan = query.to_sql(&USERS_COLLECTION, Some(ACTIVE_ONLY));
        rows::fetch_json(&self.pool, &plan).await
    }

    pub async fn find_by_id(&self, id: Uuid, include_inactive: bool) -> Result<Option<User>> {
        let sql = if include_inactive {
            format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS)
        } else {
            format!(
                "SELECT {} FROM users WHERE id = $1 AND {}",
                USER_COLUMNS, ACTIVE_ONLY
            )
        };
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE email = $1 AND {}",
            USER_COLUMNS, ACTIVE_ONLY
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn insert(
        &self,
        name: &str,
        email: &str,
        role: UserRole,
        password_hash: &str,
    ) -> Result<User> {
        let sql = format!(
            "INSERT INTO users (name, email, password, role, password_changed_at) \
             VALUES ($1, $2, $3, $4, NOW()) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(name)
            .bind(email.to_lowercase())
            .bind(password_hash)
            .bind(role)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET name = COALESCE($2, name), email = COALESCE($3, email), \
             updated_at = NOW() WHERE id = $1 AND {} RETURNING {}",
            ACTIVE_ONLY, USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(name)
            .bind(email.map(str::to_lowercase))
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Soft delete: the row stays, default reads stop seeing it.
    pub async fn soft_delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET active = FALSE, updated_at = NOW() WHERE id = $1 AND active = TRUE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_password(&self, id: Uuid, password_hash: &str) -> Result<User> {
        let sql = format!(
            "UPDATE users SET password = $2, password_changed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn store_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE users SET password_reset_token = $2, password_reset_expires = $3, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn clear_reset_token(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE users SET password_reset_token = NULL, password_reset_expires = NULL, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Looks up the owner of an unexpired reset token by its hash.
    pub async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE password_reset_token = $1 \
             AND password_reset_expires > NOW() AND {}",
            USER_COLUMNS, ACTIVE_ONLY
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Single-use consumption: sets the new password and clears the token
    /// fields in one statement.
    pub async fn reset_password(&self, id: Uuid, password_hash: &str) -> Result<User> {
        let sql = format!(
            "UPDATE users SET password = $2, password_changed_at = NOW(), \
             password_reset_token = NULL, password_reset_expires = NULL, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }
}
