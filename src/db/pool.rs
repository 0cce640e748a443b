//! SQLite connection pool
//!
//! Accepts either a bare file path, a `sqlite:` URL or `:memory:`. File
//! databases are created on first use together with their parent directory.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;

use crate::config::DatabaseConfig;

const MAX_CONNECTIONS: u32 = 16;

fn is_memory_url(url: &str) -> bool {
    url == ":memory:" || url.starts_with("sqlite::memory:")
}

/// Turn the configured location into a sqlx connection URL.
fn connection_url(url: &str) -> String {
    if url == ":memory:" {
        "sqlite::memory:".to_string()
    } else if url.starts_with("sqlite:") {
        if url.contains('?') {
            url.to_string()
        } else {
            format!("{}?mode=rwc", url)
        }
    } else {
        format!("sqlite:{}?mode=rwc", url)
    }
}

fn ensure_parent_dir(url: &str) -> Result<()> {
    let path = url.trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }
    }
    Ok(())
}

/// Open a pool for the configured database.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    let url = config.url.as_str();
    let memory = is_memory_url(url);

    if !memory {
        ensure_parent_dir(url)?;
    }

    // every connection to :memory: is a separate database
    let max_connections = if memory { 1 } else { MAX_CONNECTIONS };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(&connection_url(url))
        .await
        .with_context(|| format!("Failed to connect to SQLite database: {}", url))?;

    tracing::debug!(url, max_connections, "database pool ready");
    Ok(pool)
}

/// In-memory database for tests
pub async fn create_test_pool() -> Result<SqlitePool> {
    let config = DatabaseConfig {
        url: ":memory:".to_string(),
    };
    create_pool(&config).await
}

/// Check that the database answers.
pub async fn ping(pool: &SqlitePool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .context("Database ping failed")?;
    Ok(())
}
