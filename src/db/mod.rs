//! Database layer
//!
//! The document store is SQLite through sqlx: one table per collection,
//! hex identifiers, RFC 3339 dates.
//!
//! ```ignore
//! use bookrate::db::{create_pool, migrations};
//!
//! let pool = create_pool(&config.database).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod query;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, ping};
pub use query::{BookingFilter, RateFilter};
