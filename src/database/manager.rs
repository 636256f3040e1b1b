use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use super::memory::MemoryStore;
use super::postgres::PgStore;
use super::store::{StoreError, Stores};
use crate::config::{DatabaseConfig, StorageBackend};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Builds the configured store backend
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open the backend named by `config.backend`, running migrations first
    /// when enabled for Postgres
    pub async fn open(config: &DatabaseConfig) -> Result<Stores, StoreError> {
        match config.backend {
            StorageBackend::Memory => {
                info!("Using in-memory store");
                Ok(Stores::from_backend(MemoryStore::new()))
            }
            StorageBackend::Postgres => {
                let pool = Self::connect(config).await?;
                if config.run_migrations {
                    Self::migrate(&pool).await?;
                }
                Ok(Stores::from_backend(PgStore::new(pool)))
            }
        }
    }

    /// Create the shared connection pool
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Config("DATABASE_URL is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!(
            "Created database pool (max_connections={})",
            config.max_connections
        );
        Ok(pool)
    }

    /// Apply the embedded migrations
    pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
        MIGRATOR.run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }
}
