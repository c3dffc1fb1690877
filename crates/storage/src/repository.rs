use async_trait::async_trait;
use chrono::{DateTime, Utc};
use confirm_core::model::{ContentId, PersistedState};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Stored state of one content instance together with when it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateRecord {
    pub content_id: ContentId,
    pub state: PersistedState,
    pub saved_at: DateTime<Utc>,
}

/// Repository contract for restorable content state.
///
/// States are stored verbatim; no invariant is re-checked on the way in or out.
#[async_trait]
pub trait StateRepository: Send + Sync {
    /// Fetch the last saved state, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_state(&self, content_id: ContentId) -> Result<Option<StateRecord>, StorageError>;

    /// Persist or replace the state for a content instance.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be stored.
    async fn save_state(&self, record: &StateRecord) -> Result<(), StorageError>;

    /// Forget the stored state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if nothing was stored, or other storage errors.
    async fn delete_state(&self, content_id: ContentId) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    states: Arc<Mutex<HashMap<ContentId, StateRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateRepository for InMemoryRepository {
    async fn get_state(&self, content_id: ContentId) -> Result<Option<StateRecord>, StorageError> {
        let guard = self
            .states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&content_id).copied())
    }

    async fn save_state(&self, record: &StateRecord) -> Result<(), StorageError> {
        let mut guard = self
            .states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(record.content_id, *record);
        Ok(())
    }

    async fn delete_state(&self, content_id: ContentId) -> Result<(), StorageError> {
        let mut guard = self
            .states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .remove(&content_id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

/// Aggregate of repositories handed to services.
#[derive(Clone)]
pub struct Storage {
    pub states: Arc<dyn StateRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            states: Arc::new(InMemoryRepository::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confirm_core::time::fixed_now;

    fn record(id: u64, checked: bool, disabled: bool) -> StateRecord {
        StateRecord {
            content_id: ContentId::new(id),
            state: PersistedState::new(checked, disabled),
            saved_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn in_memory_roundtrip() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get_state(ContentId::new(1)).await.unwrap(), None);

        repo.save_state(&record(1, true, false)).await.unwrap();
        repo.save_state(&record(1, true, true)).await.unwrap();

        let stored = repo.get_state(ContentId::new(1)).await.unwrap().unwrap();
        assert_eq!(stored.state, PersistedState::new(true, true));
    }

    #[tokio::test]
    async fn in_memory_delete_missing_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.delete_state(ContentId::new(9)).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[test]
    fn repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InMemoryRepository>();
    }
}
