use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

use exam_core::model::{Answer, ExamId, ExamSessionState, QuestionId, QuestionState};

/// Errors surfaced by session store adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Storage key for one exam's session, derived from the exam id.
#[must_use]
pub fn session_storage_key(exam_id: &ExamId) -> String {
    format!("exam-session-{exam_id}")
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Persisted shape for a question's tracking flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionStateRecord {
    pub is_visited: bool,
    pub is_saved: bool,
    pub selected_answer: Option<Answer>,
    pub marked_for_review: bool,
    pub time_taken_secs: u32,
}

/// Persisted shape for one attempt.
///
/// Mirrors the domain `ExamSessionState` so store adapters can serialize
/// without leaking storage concerns into the domain layer. No status is
/// persisted anywhere in this shape; it is derived on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub exam_id: ExamId,
    pub attempt_id: Uuid,
    pub current_question_index: usize,
    pub current_section_index: usize,
    pub question_states: BTreeMap<QuestionId, QuestionStateRecord>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub remaining_seconds: u32,
    pub language: String,
    pub is_submitted: bool,
    pub is_paused: bool,
}

impl SessionRecord {
    #[must_use]
    pub fn from_state(state: &ExamSessionState) -> Self {
        let question_states = state
            .question_states
            .iter()
            .map(|(id, question)| {
                (
                    id.clone(),
                    QuestionStateRecord {
                        is_visited: question.is_visited,
                        is_saved: question.is_saved,
                        selected_answer: question.selected_answer.clone(),
                        marked_for_review: question.marked_for_review,
                        time_taken_secs: question.time_taken_secs,
                    },
                )
            })
            .collect();

        Self {
            exam_id: state.exam_id.clone(),
            attempt_id: state.attempt_id,
            current_question_index: state.current_question_index,
            current_section_index: state.current_section_index,
            question_states,
            start_time: state.start_time,
            end_time: state.end_time,
            remaining_seconds: state.remaining_seconds,
            language: state.language.clone(),
            is_submitted: state.is_submitted,
            is_paused: state.is_paused,
        }
    }

    /// Convert the record back into the domain aggregate.
    #[must_use]
    pub fn into_state(self) -> ExamSessionState {
        let question_states = self
            .question_states
            .into_iter()
            .map(|(id, record)| {
                (
                    id,
                    QuestionState {
                        is_visited: record.is_visited,
                        is_saved: record.is_saved,
                        selected_answer: record.selected_answer,
                        marked_for_review: record.marked_for_review,
                        time_taken_secs: record.time_taken_secs,
                    },
                )
            })
            .collect();

        ExamSessionState {
            exam_id: self.exam_id,
            attempt_id: self.attempt_id,
            current_question_index: self.current_question_index,
            current_section_index: self.current_section_index,
            question_states,
            start_time: self.start_time,
            end_time: self.end_time,
            remaining_seconds: self.remaining_seconds,
            language: self.language,
            is_submitted: self.is_submitted,
            is_paused: self.is_paused,
        }
    }
}

//
// ─── STORE CONTRACT ────────────────────────────────────────────────────────────
//

/// Durable key-value store for exam session snapshots.
///
/// One key per exam id, last-write-wins. The engine requires nothing
/// beyond that: no transactions, no multi-key consistency.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the persisted session for an exam, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or the stored
    /// payload cannot be decoded.
    async fn load(&self, exam_id: &ExamId) -> Result<Option<SessionRecord>, StorageError>;

    /// Persist a session snapshot, replacing any previous one for the exam.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save(&self, exam_id: &ExamId, record: &SessionRecord) -> Result<(), StorageError>;

    /// Remove the persisted session for an exam. Removing an absent
    /// session is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn delete(&self, exam_id: &ExamId) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY STORE ───────────────────────────────────────────────────────────
//

/// In-memory store for tests and prototyping.
///
/// Holds serialized JSON payloads keyed by storage key, so tests exercise
/// the same encode/decode path as a durable backend.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, exam_id: &ExamId) -> Result<Option<SessionRecord>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        let Some(payload) = guard.get(&session_storage_key(exam_id)) else {
            return Ok(None);
        };
        serde_json::from_str(payload)
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn save(&self, exam_id: &ExamId, record: &SessionRecord) -> Result<(), StorageError> {
        let payload = serde_json::to_string(record)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let mut guard = self
            .entries
            .lock()
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        guard.insert(session_storage_key(exam_id), payload);
        Ok(())
    }

    async fn delete(&self, exam_id: &ExamId) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        guard.remove(&session_storage_key(exam_id));
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
