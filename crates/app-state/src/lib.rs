//! Shopping state management for Ember Market
//!
//! This crate provides the observable shopping state store: cart,
//! favorites, catalog, and theme preference, with synchronous mutations,
//! derived reads, and best-effort snapshot persistence.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod badge;
pub mod models;
pub mod snapshot;
pub mod store;

pub use badge::BadgeDisplay;
pub use models::{CartItem, Category, Product, Theme};
pub use snapshot::{
    open_snapshot_store, SnapshotIoError, SnapshotStorage, StoreSnapshot, SNAPSHOT_KEY,
};
pub use store::{PersistenceHandle, ShoppingStore, StoreEvent, StoreState};
