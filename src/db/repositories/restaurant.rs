//! Restaurant repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use super::object_id_column;
use crate::models::{ObjectId, Restaurant};

#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    async fn create(&self, restaurant: &Restaurant) -> Result<Restaurant>;

    async fn get_by_id(&self, id: ObjectId) -> Result<Option<Restaurant>>;

    async fn get_by_phone(&self, phone: &str) -> Result<Option<Restaurant>>;

    /// Every restaurant, in insertion order
    async fn list(&self) -> Result<Vec<Restaurant>>;

    async fn update(&self, restaurant: &Restaurant) -> Result<bool>;

    async fn delete(&self, id: ObjectId) -> Result<bool>;
}

pub struct SqlxRestaurantRepository {
    pool: SqlitePool,
}

impl SqlxRestaurantRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn RestaurantRepository> {
        Arc::new(Self::new(pool))
    }
}

const RESTAURANT_COLUMNS: &str = "id, name, address, phone, password_hash";

#[async_trait]
impl RestaurantRepository for SqlxRestaurantRepository {
    async fn create(&self, restaurant: &Restaurant) -> Result<Restaurant> {
        sqlx::query(
            r#"
            INSERT INTO restaurants (id, name, address, phone, password_hash)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(restaurant.id.to_hex())
        .bind(&restaurant.name)
        .bind(&restaurant.address)
        .bind(&restaurant.phone)
        .bind(&restaurant.password_hash)
        .execute(&self.pool)
        .await
        .context("Failed to create restaurant")?;

        Ok(restaurant.clone())
    }

    async fn get_by_id(&self, id: ObjectId) -> Result<Option<Restaurant>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM restaurants WHERE id = ?",
            RESTAURANT_COLUMNS
        ))
        .bind(id.to_hex())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get restaurant by ID")?;

        row.as_ref().map(row_to_restaurant).transpose()
    }

    async fn get_by_phone(&self, phone: &str) -> Result<Option<Restaurant>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM restaurants WHERE phone = ? ORDER BY rowid LIMIT 1",
            RESTAURANT_COLUMNS
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get restaurant by phone")?;

        row.as_ref().map(row_to_restaurant).transpose()
    }

    async fn list(&self) -> Result<Vec<Restaurant>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM restaurants ORDER BY rowid",
            RESTAURANT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list restaurants")?;

        rows.iter().map(row_to_restaurant).collect()
    }

    async fn update(&self, restaurant: &Restaurant) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE restaurants
            SET name = ?, address = ?, phone = ?, password_hash = ?
            WHERE id = ?
            "#,
        )
        .bind(&restaurant.name)
        .bind(&restaurant.address)
        .bind(&restaurant.phone)
        .bind(&restaurant.password_hash)
        .bind(restaurant.id.to_hex())
        .execute(&self.pool)
        .await
        .context("Failed to update restaurant")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: ObjectId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM restaurants WHERE id = ?")
            .bind(id.to_hex())
            .execute(&self.pool)
            .await
            .context("Failed to delete restaurant")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_restaurant(row: &sqlx::sqlite::SqliteRow) -> Result<Restaurant> {
    Ok(Restaurant {
        id: object_id_column(row, "id")?,
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        phone: row.try_get("phone")?,
        password_hash: row.try_get("password_hash")?,
    })
}
