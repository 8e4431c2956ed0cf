//! SQLite-backed object store.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use bridge_traits::error::{BridgeError, Result};
use bridge_traits::storage::{ObjectRecord, ObjectStore};

/// One durable keyed collection, stored as a table in a shared SQLite
/// database. Each collection gets its own table so `remove_all` on one
/// never touches another.
pub struct SqliteObjectStore {
    pool: SqlitePool,
    table: String,
}

impl SqliteObjectStore {
    /// Opens (creating if needed) the table backing `collection`. The
    /// collection name becomes a table identifier and is restricted to
    /// alphanumerics and underscores.
    pub async fn open(pool: SqlitePool, collection: &str) -> Result<Self> {
        if collection.is_empty()
            || !collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(BridgeError::StorageError(format!(
                "invalid collection name: {collection:?}"
            )));
        }

        let table = format!("objects_{collection}");
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY NOT NULL,
                payload BLOB NOT NULL,
                updated_at TEXT NOT NULL
            )"
        ))
        .execute(&pool)
        .await
        .map_err(db_error)?;

        debug!(table, "object store ready");
        Ok(Self { pool, table })
    }
}

#[async_trait]
impl ObjectStore for SqliteObjectStore {
    async fn insert(&self, records: Vec<ObjectRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "INSERT OR REPLACE INTO {} (id, payload, updated_at) VALUES (?, ?, ?)",
            self.table
        );
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await.map_err(db_error)?;
        for record in records {
            sqlx::query(&sql)
                .bind(record.id)
                .bind(record.payload)
                .bind(&now)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }
        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        sqlx::query(&format!("DELETE FROM {} WHERE id = ?", self.table))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn remove_all(&self) -> Result<()> {
        sqlx::query(&format!("DELETE FROM {}", self.table))
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<ObjectRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT id, payload FROM {} ORDER BY id",
            self.table
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| ObjectRecord::new(row.get::<String, _>("id"), row.get::<Vec<u8>, _>("payload")))
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<ObjectRecord>> {
        let row = sqlx::query(&format!(
            "SELECT id, payload FROM {} WHERE id = ?",
            self.table
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(|row| {
            ObjectRecord::new(row.get::<String, _>("id"), row.get::<Vec<u8>, _>("payload"))
        }))
    }
}

fn db_error(err: sqlx::Error) -> BridgeError {
    BridgeError::StorageError(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        // One connection so the in-memory database is shared.
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn insert_get_and_reinsert_by_id() {
        let store = SqliteObjectStore::open(test_pool().await, "albums")
            .await
            .unwrap();

        store
            .insert(vec![ObjectRecord::new("al1", b"one".to_vec())])
            .await
            .unwrap();
        store
            .insert(vec![ObjectRecord::new("al1", b"two".to_vec())])
            .await
            .unwrap();

        let record = store.get("al1").await.unwrap().unwrap();
        assert_eq!(record.payload, b"two");
        assert_eq!(store.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn remove_and_remove_all() {
        let store = SqliteObjectStore::open(test_pool().await, "songs")
            .await
            .unwrap();
        store
            .insert(vec![
                ObjectRecord::new("s1", b"a".to_vec()),
                ObjectRecord::new("s2", b"b".to_vec()),
            ])
            .await
            .unwrap();

        store.remove("s1").await.unwrap();
        assert!(store.get("s1").await.unwrap().is_none());

        store.remove_all().await.unwrap();
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let pool = test_pool().await;
        let albums = SqliteObjectStore::open(pool.clone(), "albums")
            .await
            .unwrap();
        let songs = SqliteObjectStore::open(pool, "songs").await.unwrap();

        albums
            .insert(vec![ObjectRecord::new("al1", b"x".to_vec())])
            .await
            .unwrap();
        songs.remove_all().await.unwrap();

        assert_eq!(albums.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejects_bad_collection_names() {
        let pool = test_pool().await;
        assert!(SqliteObjectStore::open(pool.clone(), "bad name").await.is_err());
        assert!(SqliteObjectStore::open(pool, "albums; DROP TABLE x")
            .await
            .is_err());
    }
}
