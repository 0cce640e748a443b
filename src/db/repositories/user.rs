//! User repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use super::object_id_column;
use crate::models::{ObjectId, User};

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User>;

    async fn get_by_id(&self, id: ObjectId) -> Result<Option<User>>;

    /// First user registered with this phone number
    async fn get_by_phone(&self, phone_number: &str) -> Result<Option<User>>;

    /// Overwrite every field of an existing user. Returns `false` if the
    /// id is unknown.
    async fn update(&self, user: &User) -> Result<bool>;

    /// Returns `false` if nothing was deleted
    async fn delete(&self, id: ObjectId) -> Result<bool>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        create_user(&self.pool, user).await
    }

    async fn get_by_id(&self, id: ObjectId) -> Result<Option<User>> {
        get_user_by_id(&self.pool, id).await
    }

    async fn get_by_phone(&self, phone_number: &str) -> Result<Option<User>> {
        get_user_by_phone(&self.pool, phone_number).await
    }

    async fn update(&self, user: &User) -> Result<bool> {
        update_user(&self.pool, user).await
    }

    async fn delete(&self, id: ObjectId) -> Result<bool> {
        delete_user(&self.pool, id).await
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

const USER_COLUMNS: &str = "id, first_name, last_name, phone_number, password_hash";

async fn create_user(pool: &SqlitePool, user: &User) -> Result<User> {
    sqlx::query(
        r#"
        INSERT INTO users (id, first_name, last_name, phone_number, password_hash)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.id.to_hex())
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.phone_number)
    .bind(&user.password_hash)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    Ok(user.clone())
}

async fn get_user_by_id(pool: &SqlitePool, id: ObjectId) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id.to_hex())
        .fetch_optional(pool)
        .await
        .context("Failed to get user by ID")?;

    row.as_ref().map(row_to_user).transpose()
}

async fn get_user_by_phone(pool: &SqlitePool, phone_number: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM users WHERE phone_number = ? ORDER BY rowid LIMIT 1",
        USER_COLUMNS
    ))
    .bind(phone_number)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by phone number")?;

    row.as_ref().map(row_to_user).transpose()
}

async fn update_user(pool: &SqlitePool, user: &User) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET first_name = ?, last_name = ?, phone_number = ?, password_hash = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.phone_number)
    .bind(&user.password_hash)
    .bind(user.id.to_hex())
    .execute(pool)
    .await
    .context("Failed to update user")?;

    Ok(result.rows_affected() > 0)
}

async fn delete_user(pool: &SqlitePool, id: ObjectId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id.to_hex())
        .execute(pool)
        .await
        .context("Failed to delete user")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    Ok(User {
        id: object_id_column(row, "id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        phone_number: row.try_get("phone_number")?,
        password_hash: row.try_get("password_hash")?,
    })
}
