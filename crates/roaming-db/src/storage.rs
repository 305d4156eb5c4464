//! Storage backend selection

use crate::pool::{create_pool, run_migrations};
use crate::repositories::{
    InMemoryCdrRepository, InMemorySubscriberRepository, PgCdrRepository, PgSubscriberRepository,
};
use roaming_core::config::{DatabaseConfig, StorageBackend};
use roaming_core::traits::{CdrRepository, SubscriberRepository};
use roaming_core::AppResult;
use std::sync::Arc;
use tracing::{info, warn};

/// Repositories shared by the services
#[derive(Clone)]
pub struct Storage {
    pub subscribers: Arc<dyn SubscriberRepository>,
    pub cdrs: Arc<dyn CdrRepository>,
}

impl Storage {
    /// Fresh process-local storage
    pub fn in_memory() -> Self {
        Self {
            subscribers: Arc::new(InMemorySubscriberRepository::new()),
            cdrs: Arc::new(InMemoryCdrRepository::new()),
        }
    }
}

/// Build the repositories for the configured backend
///
/// For PostgreSQL this connects the pool and, when enabled, applies the
/// embedded migrations.
pub async fn create_storage(config: &DatabaseConfig) -> AppResult<Storage> {
    match config.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; records are lost on restart");
            Ok(Storage::in_memory())
        }
        StorageBackend::Postgres => {
            let pool = create_pool(&config.url, Some(config.max_connections)).await?;
            if config.run_migrations {
                run_migrations(&pool).await?;
            }
            info!("Using PostgreSQL storage");
            Ok(Storage {
                subscribers: Arc::new(PgSubscriberRepository::new(pool.clone())),
                cdrs: Arc::new(PgCdrRepository::new(pool)),
            })
        }
    }
}
