use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use exam_core::model::ExamId;

use crate::repository::{SessionRecord, SessionStore, StorageError, session_storage_key};

use super::SqliteRepository;

#[async_trait]
impl SessionStore for SqliteRepository {
    async fn load(&self, exam_id: &ExamId) -> Result<Option<SessionRecord>, StorageError> {
        let row = sqlx::query("SELECT payload FROM exam_sessions WHERE storage_key = ?1")
            .bind(session_storage_key(exam_id))
            .fetch_optional(self.pool())
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row
            .try_get("payload")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        serde_json::from_str(&payload)
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn save(&self, exam_id: &ExamId, record: &SessionRecord) -> Result<(), StorageError> {
        let payload = serde_json::to_string(record)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO exam_sessions (storage_key, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(storage_key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            ",
        )
        .bind(session_storage_key(exam_id))
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(self.pool())
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn delete(&self, exam_id: &ExamId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM exam_sessions WHERE storage_key = ?1")
            .bind(session_storage_key(exam_id))
            .execute(self.pool())
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
