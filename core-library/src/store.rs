//! Typed persistence layer over the platform object store.
//!
//! A [`Store`] owns one collection of a single entity type, serialized as
//! JSON payloads keyed by entity id. Inserting an item whose id already
//! exists replaces the stored copy, so repeated inserts are idempotent.

use std::marker::PhantomData;
use std::sync::Arc;

use bridge_traits::{ObjectRecord, ObjectStore};

use crate::error::Result;
use crate::models::Entity;

pub struct Store<T: Entity> {
    backing: Arc<dyn ObjectStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Store<T> {
    pub fn new(backing: Arc<dyn ObjectStore>) -> Self {
        Self {
            backing,
            _entity: PhantomData,
        }
    }

    /// Inserts or replaces each item, keyed by its entity id.
    pub async fn insert(&self, items: &[T]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let mut records = Vec::with_capacity(items.len());
        for item in items {
            let payload = serde_json::to_vec(item)?;
            records.push(ObjectRecord::new(item.entity_id(), payload));
        }
        self.backing.insert(records).await?;
        Ok(())
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        self.backing.remove(id).await?;
        Ok(())
    }

    pub async fn remove_all(&self) -> Result<()> {
        self.backing.remove_all().await?;
        Ok(())
    }

    pub async fn load_all(&self) -> Result<Vec<T>> {
        let records = self.backing.load_all().await?;
        let mut items = Vec::with_capacity(records.len());
        for record in records {
            items.push(serde_json::from_slice(&record.payload)?);
        }
        Ok(items)
    }

    pub async fn by_id(&self, id: &str) -> Result<Option<T>> {
        match self.backing.get(id).await? {
            Some(record) => Ok(Some(serde_json::from_slice(&record.payload)?)),
            None => Ok(None),
        }
    }
}

impl<T: Entity> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            backing: Arc::clone(&self.backing),
            _entity: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Album;
    use bridge_traits::MemoryObjectStore;

    fn store() -> Store<Album> {
        Store::new(Arc::new(MemoryObjectStore::new()))
    }

    #[tokio::test]
    async fn insert_then_load_round_trips() {
        let store = store();
        let albums = vec![
            Album::new("al1", "First", "Artist"),
            Album::new("al2", "Second", "Artist"),
        ];
        store.insert(&albums).await.unwrap();

        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().any(|a| a.id == "al1"));
    }

    #[tokio::test]
    async fn reinsert_replaces_by_id() {
        let store = store();
        store
            .insert(&[Album::new("al1", "Original", "Artist")])
            .await
            .unwrap();
        store
            .insert(&[Album::new("al1", "Renamed", "Artist").favorite(true)])
            .await
            .unwrap();

        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Renamed");
        assert!(loaded[0].is_favorite);
    }

    #[tokio::test]
    async fn by_id_misses_return_none() {
        let store = store();
        assert!(store.by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_all_empties_the_collection() {
        let store = store();
        store
            .insert(&[Album::new("al1", "First", "Artist")])
            .await
            .unwrap();
        store.remove_all().await.unwrap();
        assert!(store.load_all().await.unwrap().is_empty());
    }
}
