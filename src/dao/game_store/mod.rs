pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::info;

use crate::config::{AppConfig, StorageBackend};
use crate::dao::models::{GameEntity, GameFilter, GameInput, GameSort, Pagination};
use crate::dao::storage::StorageResult;

pub use memory::MemoryGameStore;

/// Abstraction over the persistence layer for game records.
///
/// Identifiers are passed as the raw strings received from clients; an id
/// that does not parse in the backend's format behaves like an unknown id.
pub trait GameStore: Send + Sync {
    /// Games matching `filter`, ordered by `sort`, restricted to one page.
    fn list(
        &self,
        filter: GameFilter,
        sort: GameSort,
        pagination: Pagination,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Number of games matching `filter`.
    fn count(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<u64>>;
    /// Look a game up by identifier.
    fn find(&self, id: String) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Persist a new game, assigning its identifier and timestamps.
    fn create(&self, input: GameInput) -> BoxFuture<'static, StorageResult<GameEntity>>;
    /// Replace the mutable fields of an existing game.
    fn update(
        &self,
        id: String,
        input: GameInput,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Remove a game, reporting whether it existed.
    fn delete(&self, id: String) -> BoxFuture<'static, StorageResult<bool>>;
    /// Check that the backing store answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Build the storage backend selected by the configuration.
pub async fn open_store(config: &AppConfig) -> StorageResult<Arc<dyn GameStore>> {
    match config.backend {
        StorageBackend::Memory => {
            let store = if config.seed {
                MemoryGameStore::seeded()
            } else {
                MemoryGameStore::new()
            };
            info!(seeded = config.seed, "using in-memory game store");
            Ok(Arc::new(store))
        }
        #[cfg(feature = "mongo-store")]
        StorageBackend::Mongo => {
            let mongo_config = self::mongodb::MongoConfig::from_settings(&config.mongo).await?;
            let store = self::mongodb::MongoGameStore::connect(mongo_config).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongo-store"))]
        StorageBackend::Mongo => Err(crate::dao::storage::StorageError::Unsupported {
            backend: "mongo",
        }),
    }
}
