//! Database repositories
//!
//! One repository per collection. Each exposes an `async_trait` interface
//! and an sqlx-backed implementation that services receive as
//! `Arc<dyn ...Repository>`.

pub mod booking;
pub mod rate;
pub mod restaurant;
pub mod user;

pub use booking::{BookingRepository, SqlxBookingRepository};
pub use rate::{RateRepository, SqlxRateRepository};
pub use restaurant::{RestaurantRepository, SqlxRestaurantRepository};
pub use user::{SqlxUserRepository, UserRepository};

use anyhow::{Context, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::models::ObjectId;

/// Read a hex identifier column.
pub(crate) fn object_id_column(row: &SqliteRow, column: &str) -> Result<ObjectId> {
    let raw: String = row
        .try_get(column)
        .with_context(|| format!("Missing column: {}", column))?;
    ObjectId::parse_str(&raw).with_context(|| format!("Invalid {} in database: {}", column, raw))
}
