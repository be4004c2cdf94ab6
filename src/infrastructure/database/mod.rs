// src/infrastructure/database/mod.rs
mod postgres_repository;
mod postgres_sessions;


pub use postgres_repository::create_postgres_repository;
pub use postgres_sessions::create_postgres_session_store;

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Opens the connection pool and applies pending migrations.
///
/// The database may still be starting (container orchestration), so failed
/// connects are retried once per second up to `retry_count` attempts.
pub async fn connect_with_retry(config: &DatabaseConfig) -> Result<PgPool> {
    // ---
    let mut attempt: u32 = 0;
    let pool = loop {
        attempt += 1;
        let result = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await;

        match result {
            Ok(pool) => break pool,
            Err(e) if attempt < config.retry_count => {
                tracing::warn!(attempt, error = %e, "Database not ready, retrying");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Err(e) => {
                return Err(e).context(format!(
                    "Failed to connect to database after {attempt} attempts"
                ));
            }
        }
    };

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply database migrations")?;

    tracing::info!(attempt, "Database connected and migrated");
    Ok(pool)
}
