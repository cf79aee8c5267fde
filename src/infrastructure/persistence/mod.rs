//! PostgreSQL repository implementation.
//!
//! Concrete implementation of the domain repository trait using SQLx
//! prepared statements, plus connection pool construction and migration
//! running for embedding applications.

pub mod pg_short_link_repository;

pub use pg_short_link_repository::PgShortLinkRepository;

use crate::config::Config;
use anyhow::Result;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Connects a PostgreSQL pool using the pool settings from [`Config`] and
/// applies pending migrations.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
