//! Persistence of the aggregated model
//!
//! [`ModelStore`] has two implementations: the SQLite document store and a
//! single JSON file. The backend is chosen once at startup by
//! [`select_store`]; request handlers only see the trait object.
//!
//! Known gap: neither backend protects against partial writes. A crash during
//! [`ModelStore::save`] can leave some collections cleared and others not yet
//! repopulated (SQLite), or a truncated file (JSON). Re-running ingestion is
//! the recovery path.

pub mod json_file;
pub mod sqlite;

use async_trait::async_trait;
use pmo_common::{DashboardModel, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub use json_file::JsonFileModelStore;
pub use sqlite::SqliteModelStore;

/// Save/load strategy for the whole model
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Backend name for logs and the health endpoint
    fn name(&self) -> &'static str;

    /// Connectivity probe; never errors, failure means unavailable
    async fn is_available(&self) -> bool;

    /// Replace the persisted model wholesale
    async fn save(&self, model: &DashboardModel) -> Result<()>;

    /// Read the persisted model; `None` when nothing has been saved yet
    async fn load(&self) -> Result<Option<DashboardModel>>;
}

/// Backend requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StorageChoice {
    /// SQLite when it opens and answers a ping, JSON file otherwise
    Auto,
    Sqlite,
    Json,
}

/// Pick the backend once, at startup
pub async fn select_store(
    choice: StorageChoice,
    db_path: &Path,
    json_path: &Path,
) -> Result<Arc<dyn ModelStore>> {
    let store: Arc<dyn ModelStore> = match choice {
        StorageChoice::Sqlite => Arc::new(SqliteModelStore::open(db_path).await?),
        StorageChoice::Json => Arc::new(JsonFileModelStore::new(json_path)),
        StorageChoice::Auto => match SqliteModelStore::open(db_path).await {
            Ok(store) if store.is_available().await => Arc::new(store),
            Ok(_) => {
                warn!("Document store did not answer ping, using JSON file");
                Arc::new(JsonFileModelStore::new(json_path))
            }
            Err(e) => {
                warn!("Document store unavailable ({}), using JSON file", e);
                Arc::new(JsonFileModelStore::new(json_path))
            }
        },
    };

    info!("Model storage backend: {}", store.name());
    Ok(store)
}
