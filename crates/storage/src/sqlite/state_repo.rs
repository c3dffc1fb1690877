use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::repository::{StateRecord, StateRepository, StorageError};
use confirm_core::model::{ContentId, PersistedState};

use super::SqliteRepository;

fn content_key(content_id: ContentId) -> Result<i64, StorageError> {
    i64::try_from(content_id.value())
        .map_err(|_| StorageError::Serialization(format!("content id {content_id} out of range")))
}

#[async_trait]
impl StateRepository for SqliteRepository {
    async fn get_state(&self, content_id: ContentId) -> Result<Option<StateRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT checked, disabled, saved_at
            FROM content_states
            WHERE content_id = ?1
            ",
        )
        .bind(content_key(content_id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let checked: bool = row
            .try_get("checked")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let disabled: bool = row
            .try_get("disabled")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let saved_at: DateTime<Utc> = row
            .try_get("saved_at")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        Ok(Some(StateRecord {
            content_id,
            state: PersistedState::new(checked, disabled),
            saved_at,
        }))
    }

    async fn save_state(&self, record: &StateRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO content_states (content_id, checked, disabled, saved_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(content_id) DO UPDATE SET
                checked = excluded.checked,
                disabled = excluded.disabled,
                saved_at = excluded.saved_at
            ",
        )
        .bind(content_key(record.content_id)?)
        .bind(record.state.checked)
        .bind(record.state.disabled)
        .bind(record.saved_at)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn delete_state(&self, content_id: ContentId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM content_states WHERE content_id = ?1")
            .bind(content_key(content_id)?)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
