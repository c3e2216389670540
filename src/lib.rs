//! Ember Market application core
//!
//! Wires the storage layer and the shopping state store together. Screens
//! and rendering live elsewhere; they consume the store re-exported from
//! here and never mutate state except through it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use app_core;
pub use app_state;
pub use storage;

use std::sync::Arc;

use app_state::{open_snapshot_store, PersistenceHandle, ShoppingStore};
use storage::{KvConfig, KvError, KvStore};

/// Startup configuration
#[derive(Debug, Clone, Default)]
pub struct BootstrapConfig {
    /// Key-value store settings
    pub kv: KvConfig,
}

impl BootstrapConfig {
    /// Configuration with a custom database path
    pub fn at(path: impl Into<String>) -> Self {
        Self { kv: KvConfig::new(path) }
    }
}

/// A fully wired application core
pub struct App {
    /// The shopping state store
    pub store: Arc<ShoppingStore>,
    /// Handle for the background snapshot writer
    pub persistence: PersistenceHandle,
    /// The underlying key-value store
    pub kv: Arc<KvStore>,
}

/// Open storage, restore the last snapshot, and start the snapshot writer
///
/// Products and categories are not part of the snapshot: the data loader
/// calls `set_products`/`set_categories` on the returned store afterwards,
/// on every start.
pub async fn bootstrap(config: BootstrapConfig) -> Result<App, KvError> {
    let kv = Arc::new(KvStore::new(config.kv)?);
    let store = Arc::new(ShoppingStore::new());

    store.hydrate(&open_snapshot_store(Arc::clone(&kv))).await;
    let persistence = store.attach_persistence(open_snapshot_store(Arc::clone(&kv)));

    Ok(App { store, persistence, kv })
}
