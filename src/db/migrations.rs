//! Database migrations
//!
//! Migrations are embedded in the binary as SQL strings and applied in
//! version order. Applied versions are recorded in `_migrations`, so running
//! them again is a no-op.
//!
//! ```ignore
//! let pool = create_pool(&config.database).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

/// One schema step
#[derive(Debug, Clone)]
pub struct Migration {
    /// Unique, increasing version number
    pub version: i32,
    pub name: &'static str,
    /// One or more `;`-separated statements
    pub up: &'static str,
}

/// Schema history. Identifiers are 24-char hex strings, dates are RFC 3339
/// text so that range comparisons work lexically.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users",
        up: r#"
            CREATE TABLE IF NOT EXISTS users (
                id CHAR(24) PRIMARY KEY,
                first_name VARCHAR(100) NOT NULL,
                last_name VARCHAR(100) NOT NULL,
                phone_number VARCHAR(32) NOT NULL,
                password_hash VARCHAR(255) NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_users_phone_number ON users(phone_number);
        "#,
    },
    Migration {
        version: 2,
        name: "create_restaurants",
        up: r#"
            CREATE TABLE IF NOT EXISTS restaurants (
                id CHAR(24) PRIMARY KEY,
                name VARCHAR(200) NOT NULL,
                address VARCHAR(255) NOT NULL,
                phone VARCHAR(32) NOT NULL,
                password_hash VARCHAR(255) NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_restaurants_phone ON restaurants(phone);
        "#,
    },
    // No foreign keys: bookings and rates may reference ids that do not exist.
    Migration {
        version: 3,
        name: "create_bookings",
        up: r#"
            CREATE TABLE IF NOT EXISTS bookings (
                id CHAR(24) PRIMARY KEY,
                user_id CHAR(24) NOT NULL,
                restaurant_id CHAR(24) NOT NULL,
                date TEXT NOT NULL,
                cancelled BOOLEAN DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS idx_bookings_user_id ON bookings(user_id);
            CREATE INDEX IF NOT EXISTS idx_bookings_restaurant_id ON bookings(restaurant_id);
            CREATE INDEX IF NOT EXISTS idx_bookings_date ON bookings(date);
        "#,
    },
    Migration {
        version: 4,
        name: "create_rates",
        up: r#"
            CREATE TABLE IF NOT EXISTS rates (
                id CHAR(24) PRIMARY KEY,
                user_id CHAR(24) NOT NULL,
                restaurant_id CHAR(24) NOT NULL,
                rating INTEGER NOT NULL,
                comment TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_rates_restaurant_id ON rates(restaurant_id);
            CREATE INDEX IF NOT EXISTS idx_rates_user_id ON rates(user_id);
            CREATE INDEX IF NOT EXISTS idx_rates_date ON rates(date);
        "#,
    },
];

/// Apply all pending migrations.
///
/// Returns the number of migrations applied by this call.
pub async fn run_migrations(pool: &SqlitePool) -> Result<usize> {
    create_migrations_table(pool).await?;

    let applied = applied_versions(pool).await?;
    let mut count = 0;

    for migration in MIGRATIONS {
        if applied.contains(&migration.version) {
            continue;
        }
        tracing::info!(
            "Applying migration {}: {}",
            migration.version,
            migration.name
        );
        apply_migration(pool, migration)
            .await
            .with_context(|| format!("Failed to apply migration: {}", migration.name))?;
        count += 1;
    }

    if count > 0 {
        tracing::info!("Applied {} migration(s)", count);
    } else {
        tracing::debug!("No pending migrations");
    }

    Ok(count)
}

async fn create_migrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create migrations table")?;
    Ok(())
}

async fn applied_versions(pool: &SqlitePool) -> Result<Vec<i32>> {
    let rows = sqlx::query("SELECT version FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?;

    rows.iter()
        .map(|row| row.try_get::<i64, _>("version").map(|v| v as i32))
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid migration record")
}

async fn apply_migration(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    let mut tx = pool.begin().await?;

    for statement in split_sql_statements(migration.up) {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

fn truncate_sql(sql: &str) -> String {
    match sql.char_indices().nth(100) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}

/// Split a script on `;`, dropping blank and comment-only pieces.
fn split_sql_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty() && !is_comment_only(s))
        .collect()
}

fn is_comment_only(s: &str) -> bool {
    s.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with("--"))
}

/// Number of migrations not yet applied
pub async fn pending_count(pool: &SqlitePool) -> Result<usize> {
    create_migrations_table(pool).await?;
    let applied = applied_versions(pool).await?;
    Ok(MIGRATIONS
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .count())
}
