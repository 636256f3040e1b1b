use anyhow::{bail, Context};

use crate::config::{AppConfig, StorageBackend};
use crate::database::DatabaseManager;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    if config.database.backend != StorageBackend::Postgres {
        bail!("migrations only apply to the postgres backend (STORAGE_BACKEND=postgres)");
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    DatabaseManager::migrate(&pool).await.context("failed to apply migrations")?;

    println!("Migrations applied");
    Ok(())
}
