//! Bounded, most-recent-first search history persisted in a key-value store.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    error::PersistenceError,
    model::{HISTORY_CAPACITY, HistoryEntry},
};

pub mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Key the serialized history list is stored under.
pub const HISTORY_KEY: &str = "search-history";

/// Clones share the underlying store and its write lock.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    // Held across each read-modify-write so concurrent updates never interleave.
    write_lock: Arc<Mutex<()>>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// History backed by a throwaway in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Stored entries, most recent first. Empty if nothing was persisted yet.
    pub async fn list(&self) -> Result<Vec<HistoryEntry>, PersistenceError> {
        let Some(raw) = self.store.get(HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&raw).map_err(|e| PersistenceError::Corrupt {
            key: HISTORY_KEY.to_string(),
            reason: e.to_string(),
        })
    }

    /// Record a search at the front, evicting the oldest entries beyond capacity.
    pub async fn append(
        &self,
        location_name: &str,
        lat: f64,
        lon: f64,
    ) -> Result<HistoryEntry, PersistenceError> {
        let entry = HistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            location_name: location_name.to_string(),
            lat,
            lon,
        };

        let _guard = self.write_lock.lock().await;
        let mut entries = self.list().await?;
        entries.insert(0, entry.clone());
        entries.truncate(HISTORY_CAPACITY);
        self.persist(&entries).await?;

        tracing::debug!(id = %entry.id, location = location_name, "history entry added");
        Ok(entry)
    }

    /// Delete the entry with `id`. Unknown ids are ignored.
    pub async fn remove(&self, id: &str) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.list().await?;
        let before = entries.len();
        entries.retain(|e| e.id != id);

        if entries.len() == before {
            tracing::debug!(id, "history entry not found; nothing to remove");
            return Ok(());
        }
        self.persist(&entries).await
    }

    pub async fn clear(&self) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().await;
        self.persist(&[]).await
    }

    async fn persist(&self, entries: &[HistoryEntry]) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(entries)?;
        self.store.set(HISTORY_KEY, &raw).await
    }
}
