//! Persistent Storage Abstractions
//!
//! Provides platform-agnostic traits for the durable object collections that
//! back the local catalog cache, and for secure credential storage.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::{BridgeError, Result};

/// A single stored object: an entity id plus its serialized payload.
///
/// The store does not interpret payloads; serialization is owned by the
/// typed cache layer sitting on top of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub id: String,
    pub payload: Vec<u8>,
}

impl ObjectRecord {
    pub fn new(id: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }
}

/// Durable keyed object collection.
///
/// One instance manages one collection (e.g. "albums"). Semantics required
/// by the catalog cache:
///
/// - `insert` is an upsert: a record with an existing id overwrites the old
///   record, it never duplicates. Idempotent.
/// - `remove_all` followed by `insert` is NOT atomic; callers design their
///   refresh flows to be restartable after a partial failure.
/// - `load_all` returns the current snapshot; ordering carries no meaning.
///
/// Implementations: SQLite on desktop (`bridge-desktop`), platform stores on
/// mobile, [`MemoryObjectStore`] for tests and preview mode.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upsert a batch of records by id.
    async fn insert(&self, records: Vec<ObjectRecord>) -> Result<()>;

    /// Remove a single record. Removing an absent id is not an error.
    async fn remove(&self, id: &str) -> Result<()>;

    /// Clear the whole collection.
    async fn remove_all(&self) -> Result<()>;

    /// Load every record currently in the collection.
    async fn load_all(&self) -> Result<Vec<ObjectRecord>>;

    /// Point lookup by id.
    async fn get(&self, id: &str) -> Result<Option<ObjectRecord>>;
}

/// Secure credential storage.
///
/// Backed by the OS keychain/keystore on real hosts. Only string secrets are
/// needed here (the server account password).
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Store a secret under a key, replacing any previous value.
    async fn set_secret(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a secret. `Ok(None)` when the key has never been stored.
    async fn get_secret(&self, key: &str) -> Result<Option<String>>;

    /// Delete a secret. Deleting an absent key is not an error.
    async fn delete_secret(&self, key: &str) -> Result<()>;
}

/// In-process [`ObjectStore`] implementation.
///
/// Useful for tests and preview/demo modes where persistence across runs is
/// not wanted. Lock is never held across an await point.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    records: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.records
            .lock()
            .map_err(|_| BridgeError::StorageError("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn insert(&self, records: Vec<ObjectRecord>) -> Result<()> {
        let mut map = self.lock()?;
        for record in records {
            map.insert(record.id, record.payload);
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.lock()?.remove(id);
        Ok(())
    }

    async fn remove_all(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<ObjectRecord>> {
        let map = self.lock()?;
        Ok(map
            .iter()
            .map(|(id, payload)| ObjectRecord::new(id.clone(), payload.clone()))
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<ObjectRecord>> {
        let map = self.lock()?;
        Ok(map
            .get(id)
            .map(|payload| ObjectRecord::new(id, payload.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_is_upsert_by_id() {
        let store = MemoryObjectStore::new();
        store
            .insert(vec![ObjectRecord::new("a", b"one".to_vec())])
            .await
            .unwrap();
        store
            .insert(vec![ObjectRecord::new("a", b"two".to_vec())])
            .await
            .unwrap();

        let all = store.load_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].payload, b"two".to_vec());
    }

    #[tokio::test]
    async fn remove_all_clears_collection() {
        let store = MemoryObjectStore::new();
        store
            .insert(vec![
                ObjectRecord::new("a", vec![1]),
                ObjectRecord::new("b", vec![2]),
            ])
            .await
            .unwrap();

        store.remove_all().await.unwrap();
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_returns_none_for_absent_id() {
        let store = MemoryObjectStore::new();
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_absent_id_is_ok() {
        let store = MemoryObjectStore::new();
        store.remove("missing").await.unwrap();
    }
}
