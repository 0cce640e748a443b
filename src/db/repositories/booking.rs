//! Booking repository
//!
//! Besides plain CRUD this serves every booking list endpoint through
//! [`BookingFilter`], and implements cancellation as a flag update.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::sync::Arc;

use super::object_id_column;
use crate::db::query::BookingFilter;
use crate::models::{Booking, ObjectId};

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: &Booking) -> Result<Booking>;

    async fn get_by_id(&self, id: ObjectId) -> Result<Option<Booking>>;

    /// Bookings matching `filter`, ordered by date
    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>>;

    async fn update(&self, booking: &Booking) -> Result<bool>;

    /// Set `cancelled`. Returns `false` only when the id is unknown, so
    /// cancelling twice reports success both times.
    async fn cancel(&self, id: ObjectId) -> Result<bool>;

    async fn delete(&self, id: ObjectId) -> Result<bool>;
}

pub struct SqlxBookingRepository {
    pool: SqlitePool,
}

impl SqlxBookingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn BookingRepository> {
        Arc::new(Self::new(pool))
    }
}

const BOOKING_COLUMNS: &str = "id, user_id, restaurant_id, date, cancelled";

#[async_trait]
impl BookingRepository for SqlxBookingRepository {
    async fn create(&self, booking: &Booking) -> Result<Booking> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, user_id, restaurant_id, date, cancelled)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(booking.id.to_hex())
        .bind(booking.user_id.to_hex())
        .bind(booking.restaurant_id.to_hex())
        .bind(booking.date)
        .bind(booking.cancelled)
        .execute(&self.pool)
        .await
        .context("Failed to create booking")?;

        Ok(booking.clone())
    }

    async fn get_by_id(&self, id: ObjectId) -> Result<Option<Booking>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM bookings WHERE id = ?",
            BOOKING_COLUMNS
        ))
        .bind(id.to_hex())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get booking by ID")?;

        row.as_ref().map(row_to_booking).transpose()
    }

    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>> {
        let mut qb =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM bookings", BOOKING_COLUMNS));
        filter.push_where(&mut qb);
        qb.push(" ORDER BY date, rowid");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list bookings")?;

        rows.iter().map(row_to_booking).collect()
    }

    async fn update(&self, booking: &Booking) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET user_id = ?, restaurant_id = ?, date = ?, cancelled = ?
            WHERE id = ?
            "#,
        )
        .bind(booking.user_id.to_hex())
        .bind(booking.restaurant_id.to_hex())
        .bind(booking.date)
        .bind(booking.cancelled)
        .bind(booking.id.to_hex())
        .execute(&self.pool)
        .await
        .context("Failed to update booking")?;

        Ok(result.rows_affected() > 0)
    }

    async fn cancel(&self, id: ObjectId) -> Result<bool> {
        // SQLite counts matched rows, so an already cancelled booking still reports 1
        let result = sqlx::query("UPDATE bookings SET cancelled = 1 WHERE id = ?")
            .bind(id.to_hex())
            .execute(&self.pool)
            .await
            .context("Failed to cancel booking")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: ObjectId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id.to_hex())
            .execute(&self.pool)
            .await
            .context("Failed to delete booking")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_booking(row: &sqlx::sqlite::SqliteRow) -> Result<Booking> {
    let date: DateTime<Utc> = row.try_get("date").context("Invalid booking date")?;
    let cancelled: Option<bool> = row.try_get("cancelled")?;

    Ok(Booking {
        id: object_id_column(row, "id")?,
        user_id: object_id_column(row, "user_id")?,
        restaurant_id: object_id_column(row, "restaurant_id")?,
        date,
        cancelled: cancelled.unwrap_or(false),
    })
}
