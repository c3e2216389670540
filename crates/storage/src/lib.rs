//! Storage layer for Ember Market
//!
//! This crate provides the key-value blob store and named snapshot
//! persistence. It knows nothing about the shopping domain.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;
pub mod snapshot;

pub use kv::{KvConfig, KvError, KvStore};
pub use snapshot::{SnapshotError, SnapshotStore};
