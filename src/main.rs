//! Bookrate - restaurant booking and rating backend

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookrate::{
    api::{self, AppState},
    config::Config,
    db,
    services::TokenService,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookrate=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting bookrate...");

    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database).await?;
    db::ping(&pool).await?;
    tracing::info!("Database connected: {}", config.database.url);

    let pending = db::migrations::pending_count(&pool).await?;
    if pending > 0 {
        tracing::info!("Applying {} pending migration(s)", pending);
    }
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    let tokens = TokenService::from_config(&config.auth)?;
    let state = AppState::new(pool, tokens);

    let cors_origin = HeaderValue::from_str(&config.server.cors_origin)
        .with_context(|| format!("Invalid CORS origin: {}", config.server.cors_origin))?;
    let app = api::build_router(state, cors_origin);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
