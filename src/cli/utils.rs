use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryStore, PgStore, Store};

/// Open the store the server runs against.
///
/// With `memory` set nothing touches PostgreSQL; otherwise the pool is opened
/// from `DATABASE_URL` and migrations run when the environment enables them.
pub async fn open_store(config: &AppConfig, memory: bool) -> anyhow::Result<Arc<dyn Store>> {
    if memory {
        info!("Using in-memory store; data is lost on shutdown");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let manager = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to PostgreSQL (set DATABASE_URL or pass --memory)")?;
    if config.database.run_migrations {
        manager.migrate().await.context("failed to apply migrations")?;
    }
    Ok(Arc::new(PgStore::new(manager.pool())))
}
