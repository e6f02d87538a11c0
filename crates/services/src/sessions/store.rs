use std::fmt;
use std::sync::Arc;

use exam_core::Clock;
use exam_core::model::{ExamConfiguration, ExamSessionState};
use storage::repository::{SessionRecord, SessionStore};

use super::staleness::matches_configuration;

//
// ─── SESSION STATE STORE ───────────────────────────────────────────────────────
//

/// Canonical, persisted state for one exam attempt.
///
/// Exclusive ownership is the serialization mechanism: every mutation goes
/// through [`ExamSessionStore::update`] behind `&mut self`, so an updater
/// always composes against the result of the previous one, never against a
/// stale snapshot.
pub struct ExamSessionStore {
    config: Arc<ExamConfiguration>,
    sessions: Arc<dyn SessionStore>,
    clock: Clock,
    state: ExamSessionState,
}

impl ExamSessionStore {
    /// Rehydrate the persisted session for this configuration, or start
    /// fresh when none exists, it is stale, or it cannot be read.
    pub async fn initialize(
        config: ExamConfiguration,
        sessions: Arc<dyn SessionStore>,
        clock: Clock,
    ) -> Self {
        let persisted = match sessions.load(config.id()).await {
            Ok(found) => found.map(SessionRecord::into_state),
            Err(err) => {
                tracing::warn!(exam_id = %config.id(), error = %err,
                    "persisted session unreadable, starting fresh");
                None
            }
        };

        match persisted {
            Some(state) if matches_configuration(&state, &config) => Self {
                config: Arc::new(config),
                sessions,
                clock,
                state,
            },
            _ => {
                let state = ExamSessionState::fresh(&config, clock.now());
                let store = Self {
                    config: Arc::new(config),
                    sessions,
                    clock,
                    state,
                };
                store.persist().await;
                store
            }
        }
    }

    #[must_use]
    pub fn config(&self) -> &ExamConfiguration {
        &self.config
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Latest canonical snapshot. Question statuses are derived on read;
    /// nothing stored can go stale.
    #[must_use]
    pub fn snapshot(&self) -> &ExamSessionState {
        &self.state
    }

    /// The only mutation path: apply a pure transform to the previous
    /// state, make the result canonical, then write it through.
    ///
    /// The in-memory state advances before the write, and a failed write is
    /// logged and swallowed, so the attempt stays usable when the durable
    /// store rejects it.
    pub async fn update<F>(&mut self, updater: F) -> &ExamSessionState
    where
        F: FnOnce(&ExamSessionState) -> ExamSessionState,
    {
        self.state = updater(&self.state);
        self.persist().await;
        &self.state
    }

    /// Discard any progress and restart this attempt from scratch.
    pub async fn reset(&mut self) -> &ExamSessionState {
        self.state = ExamSessionState::fresh(&self.config, self.clock.now());
        self.persist().await;
        &self.state
    }

    pub(super) fn config_handle(&self) -> Arc<ExamConfiguration> {
        Arc::clone(&self.config)
    }

    async fn persist(&self) {
        let record = SessionRecord::from_state(&self.state);
        if let Err(err) = self.sessions.save(self.config.id(), &record).await {
            tracing::warn!(exam_id = %self.config.id(), error = %err,
                "failed to persist exam session");
        }
    }
}

impl fmt::Debug for ExamSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSessionStore")
            .field("exam_id", &self.config.id())
            .field("current_question_index", &self.state.current_question_index)
            .field("question_count", &self.state.question_states.len())
            .field("is_submitted", &self.state.is_submitted)
            .finish_non_exhaustive()
    }
}
