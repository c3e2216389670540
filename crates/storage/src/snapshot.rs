//! Named snapshot persistence
//!
//! This module wraps a serializable payload in a versioned, checksummed
//! envelope and stores it under a single named key in the blob store.
//! Writes carry the revision of the in-memory state that produced them:
//! a write that lost the race against a newer revision is skipped rather
//! than applied, so completion order can never roll state back.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

use crate::kv::{KvError, KvStore};

/// Snapshot error types
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Underlying key-value store error
    #[error("Storage error: {0}")]
    Storage(#[from] KvError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Corruption detected
    #[error("Corruption detected: {0}")]
    Corruption(String),

    /// Schema version mismatch
    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaMismatch {
        /// Expected schema version
        expected: u32,
        /// Found schema version
        found: u32,
    },
}

/// Result type for snapshot operations
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Versioned snapshot envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotEnvelope<T> {
    /// Schema version of the payload
    schema_version: u32,
    /// Revision of the in-memory state that produced the payload
    revision: u64,
    /// Checksum for corruption detection
    checksum: String,
    /// The actual payload
    data: T,
}

impl<T: Serialize> SnapshotEnvelope<T> {
    fn new(schema_version: u32, revision: u64, data: T) -> Result<Self> {
        let data_json = serde_json::to_string(&data)?;
        let checksum = format!("{:x}", md5::compute(&data_json));

        Ok(Self { schema_version, revision, checksum, data })
    }

    fn verify_checksum(&self) -> Result<()> {
        let data_json = serde_json::to_string(&self.data)?;
        let computed = format!("{:x}", md5::compute(&data_json));

        if computed != self.checksum {
            return Err(SnapshotError::Corruption(format!(
                "Checksum mismatch: expected {}, got {}",
                self.checksum, computed
            )));
        }

        Ok(())
    }
}

/// Named snapshot stored in the key-value blob store
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use storage::{KvStore, SnapshotStore};
///
/// let kv = Arc::new(KvStore::in_memory().unwrap());
/// let snapshots: SnapshotStore<Vec<String>> = SnapshotStore::new(kv, "app:state", 1);
///
/// snapshots.save(1, &vec!["hello".to_string()]).unwrap();
/// let (revision, data) = snapshots.load().unwrap().unwrap();
/// assert_eq!(revision, 1);
/// assert_eq!(data, vec!["hello".to_string()]);
/// ```
pub struct SnapshotStore<T> {
    kv: Arc<KvStore>,
    key: String,
    schema_version: u32,
    _phantom: PhantomData<T>,
}

impl<T> SnapshotStore<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Create a snapshot store over the given key
    pub fn new(kv: Arc<KvStore>, key: impl Into<String>, schema_version: u32) -> Self {
        Self {
            kv,
            key: key.into(),
            schema_version,
            _phantom: PhantomData,
        }
    }

    /// Load the stored snapshot and its revision, if any
    ///
    /// Verifies the checksum and schema version before handing the payload
    /// back; a missing key is not an error.
    pub fn load(&self) -> Result<Option<(u64, T)>> {
        let envelope: Option<SnapshotEnvelope<T>> = self.kv.get(&self.key)?;

        match envelope {
            None => Ok(None),
            Some(envelope) => {
                envelope.verify_checksum()?;

                if envelope.schema_version != self.schema_version {
                    return Err(SnapshotError::SchemaMismatch {
                        expected: self.schema_version,
                        found: envelope.schema_version,
                    });
                }

                Ok(Some((envelope.revision, envelope.data)))
            }
        }
    }

    /// Persist a snapshot taken at the given revision
    ///
    /// Last-write-wins by revision of the in-memory state, not by write
    /// completion order: when the stored envelope already carries an equal
    /// or higher revision the write is skipped and `Ok(false)` is returned.
    pub fn save(&self, revision: u64, data: &T) -> Result<bool> {
        let next = SnapshotEnvelope::new(self.schema_version, revision, data.clone())?;

        loop {
            let current: Option<SnapshotEnvelope<T>> = self.kv.get(&self.key)?;

            if let Some(existing) = &current {
                if existing.revision >= revision {
                    tracing::debug!(
                        "skipping stale snapshot write for {}: stored revision {} >= {}",
                        self.key,
                        existing.revision,
                        revision
                    );
                    return Ok(false);
                }
            }

            match self
                .kv
                .compare_and_swap(&self.key, current.as_ref(), Some(&next))?
            {
                Ok(()) => return Ok(true),
                // Raced with another writer; re-read and re-check the revision
                Err(_) => continue,
            }
        }
    }

    /// Remove the stored snapshot
    pub fn clear(&self) -> Result<bool> {
        Ok(self.kv.remove(&self.key)?)
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<()> {
        self.kv.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
    struct TestState {
        counter: i32,
        name: String,
    }

    fn store() -> SnapshotStore<TestState> {
        let kv = Arc::new(KvStore::in_memory().unwrap());
        SnapshotStore::new(kv, "test:state", 1)
    }

    #[test]
    fn test_load_missing_is_none() {
        let snapshots = store();
        assert!(snapshots.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let snapshots = store();

        let state = TestState { counter: 42, name: "persisted".to_string() };
        assert!(snapshots.save(3, &state).unwrap());

        let (revision, loaded) = snapshots.load().unwrap().unwrap();
        assert_eq!(revision, 3);
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_stale_write_is_skipped() {
        let snapshots = store();

        let newer = TestState { counter: 5, name: "newer".to_string() };
        let older = TestState { counter: 3, name: "older".to_string() };

        assert!(snapshots.save(5, &newer).unwrap());

        // A write carrying an older revision must not clobber the newer one,
        // regardless of completion order
        assert!(!snapshots.save(3, &older).unwrap());
        assert!(!snapshots.save(5, &older).unwrap());

        let (revision, loaded) = snapshots.load().unwrap().unwrap();
        assert_eq!(revision, 5);
        assert_eq!(loaded, newer);
    }

    #[test]
    fn test_newer_write_replaces() {
        let snapshots = store();

        snapshots.save(1, &TestState { counter: 1, name: "one".to_string() }).unwrap();
        assert!(snapshots.save(2, &TestState { counter: 2, name: "two".to_string() }).unwrap());

        let (revision, loaded) = snapshots.load().unwrap().unwrap();
        assert_eq!(revision, 2);
        assert_eq!(loaded.counter, 2);
    }

    #[test]
    fn test_corruption_detection() {
        let kv = Arc::new(KvStore::in_memory().unwrap());
        let snapshots: SnapshotStore<TestState> = SnapshotStore::new(kv.clone(), "test:state", 1);

        // Hand-write an envelope whose checksum does not match the payload
        let tampered = serde_json::json!({
            "schemaVersion": 1,
            "revision": 1,
            "checksum": "00000000000000000000000000000000",
            "data": { "counter": 9, "name": "tampered" },
        });
        kv.set("test:state", &tampered).unwrap();

        let result = snapshots.load();
        assert!(matches!(result, Err(SnapshotError::Corruption(_))));
    }

    #[test]
    fn test_schema_mismatch() {
        let kv = Arc::new(KvStore::in_memory().unwrap());

        let v1: SnapshotStore<TestState> = SnapshotStore::new(kv.clone(), "test:state", 1);
        v1.save(1, &TestState::default()).unwrap();

        let v2: SnapshotStore<TestState> = SnapshotStore::new(kv, "test:state", 2);
        let result = v2.load();
        assert!(matches!(
            result,
            Err(SnapshotError::SchemaMismatch { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn test_clear() {
        let snapshots = store();

        snapshots.save(1, &TestState::default()).unwrap();
        assert!(snapshots.clear().unwrap());
        assert!(snapshots.load().unwrap().is_none());
        assert!(!snapshots.clear().unwrap());
    }
}
