//! Store connection for the Estates API.
//!
//! Postgres in deployments, SQLite in tests; both go through the same
//! SeaORM pool and migrator.

use anyhow::{Context, Result, bail};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::AppConfig;

const CONNECT_ATTEMPTS: u32 = 5;
const FIRST_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Connects to `database_url`, retrying with exponential backoff.
pub async fn init_pool(cfg: &AppConfig) -> Result<DatabaseConnection> {
    if cfg.database_url.trim().is_empty() {
        bail!("ESTATES_DATABASE_URL must not be empty");
    }

    let mut options = ConnectOptions::new(cfg.database_url.as_str());
    options
        .max_connections(cfg.db_max_connections)
        .acquire_timeout(Duration::from_millis(cfg.db_acquire_timeout_ms))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let mut delay = FIRST_RETRY_DELAY;
    let mut attempt = 1;
    loop {
        match Database::connect(options.clone()).await {
            Ok(conn) => {
                log::info!("Connected to the listing store (attempt {attempt})");
                return Ok(conn);
            }
            Err(err) if attempt < CONNECT_ATTEMPTS => {
                log::warn!("Store connection attempt {attempt} failed: {err}; retrying in {delay:?}");
                sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("could not connect to the listing store after {attempt} attempts")
                });
            }
        }
    }
}

/// Brings the schema up to date.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    use migration::{Migrator, MigratorTrait};

    Migrator::up(db, None)
        .await
        .context("Failed to apply database migrations")?;
    log::info!("Database migrations applied");

    Ok(())
}

/// Round-trips to the store. Fails for a closed or never-opened handle.
pub async fn health_check(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.ping().await
}
