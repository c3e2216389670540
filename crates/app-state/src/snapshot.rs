//! Persisted subset of the store state
//!
//! Exactly cart items, favorites, and theme survive a restart. Products
//! and categories are deliberately absent from this type: the data loader
//! re-supplies them on every start, and keeping the subset a distinct
//! struct makes that exclusion a type-level fact rather than a convention.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::models::{CartItem, Product, Theme};
use storage::{KvStore, SnapshotStore};

/// Key under which the snapshot lives in the blob store
pub const SNAPSHOT_KEY: &str = "shop:state";

/// Schema version of the persisted snapshot
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// The serialized subset of store state that survives restarts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// Cart contents
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
    /// Favorite products
    #[serde(default)]
    pub favorites: Vec<Product>,
    /// Theme preference
    #[serde(default)]
    pub theme: Theme,
}

/// Error surfaced by snapshot backends
#[derive(Debug, Error)]
pub enum SnapshotIoError {
    /// Backend failure, already stringified
    #[error("Snapshot backend error: {0}")]
    Backend(String),
}

/// Backend the store persists through
///
/// Implementations must honor last-write-wins by revision: a write
/// carrying a revision lower than or equal to the stored one is skipped,
/// never applied.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Load the stored snapshot and its revision, if any
    async fn load(&self) -> Result<Option<(u64, StoreSnapshot)>, SnapshotIoError>;

    /// Persist a snapshot taken at the given revision
    ///
    /// Returns false when an equal or newer revision was already stored.
    async fn persist(
        &self,
        revision: u64,
        snapshot: &StoreSnapshot,
    ) -> Result<bool, SnapshotIoError>;
}

#[async_trait]
impl SnapshotStorage for SnapshotStore<StoreSnapshot> {
    async fn load(&self) -> Result<Option<(u64, StoreSnapshot)>, SnapshotIoError> {
        SnapshotStore::load(self).map_err(|e| SnapshotIoError::Backend(e.to_string()))
    }

    async fn persist(
        &self,
        revision: u64,
        snapshot: &StoreSnapshot,
    ) -> Result<bool, SnapshotIoError> {
        self.save(revision, snapshot)
            .map_err(|e| SnapshotIoError::Backend(e.to_string()))
    }
}

/// Open the shop snapshot store over a key-value store
pub fn open_snapshot_store(kv: Arc<KvStore>) -> SnapshotStore<StoreSnapshot> {
    SnapshotStore::new(kv, SNAPSHOT_KEY, SNAPSHOT_SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product(id: &str) -> Product {
        Product {
            id: id.to_string(),
            name: "Desk Lamp".to_string(),
            price: 24.0,
            image: "https://example.com/lamp.jpg".to_string(),
            description: "Adjustable LED lamp".to_string(),
            category: "home".to_string(),
            rating: 4.1,
            reviews: 57,
            original_price: None,
            discount: None,
        }
    }

    #[test]
    fn test_snapshot_default_is_empty() {
        let snapshot = StoreSnapshot::default();
        assert!(snapshot.cart_items.is_empty());
        assert!(snapshot.favorites.is_empty());
        assert_eq!(snapshot.theme, Theme::Light);
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = StoreSnapshot {
            cart_items: vec![CartItem { product: sample_product("p1"), quantity: 2 }],
            favorites: vec![sample_product("p2")],
            theme: Theme::Dark,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["cartItems"][0]["quantity"], 2);
        assert_eq!(json["favorites"][0]["id"], "p2");
        assert_eq!(json["theme"], "dark");

        let parsed: StoreSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_snapshot_missing_fields_default() {
        // A snapshot written by an older client may omit fields entirely
        let parsed: StoreSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, StoreSnapshot::default());
    }

    #[tokio::test]
    async fn test_snapshot_storage_roundtrip() {
        let kv = Arc::new(KvStore::in_memory().unwrap());
        let backend = open_snapshot_store(kv);

        let snapshot = StoreSnapshot {
            cart_items: vec![],
            favorites: vec![sample_product("p9")],
            theme: Theme::Dark,
        };

        assert!(SnapshotStorage::persist(&backend, 4, &snapshot).await.unwrap());

        let (revision, loaded) = SnapshotStorage::load(&backend).await.unwrap().unwrap();
        assert_eq!(revision, 4);
        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn test_snapshot_storage_honors_revisions() {
        let kv = Arc::new(KvStore::in_memory().unwrap());
        let backend = open_snapshot_store(kv);

        let newer = StoreSnapshot { theme: Theme::Dark, ..Default::default() };
        let older = StoreSnapshot::default();

        assert!(SnapshotStorage::persist(&backend, 7, &newer).await.unwrap());
        assert!(!SnapshotStorage::persist(&backend, 6, &older).await.unwrap());

        let (revision, loaded) = SnapshotStorage::load(&backend).await.unwrap().unwrap();
        assert_eq!(revision, 7);
        assert_eq!(loaded.theme, Theme::Dark);
    }
}
