//! Persisted-session staleness detection.

use exam_core::model::{ExamConfiguration, ExamSessionState};

/// True when a persisted session still belongs to the loaded configuration.
///
/// A session is stale when the exam id differs, the stored entry count
/// differs from the configuration's question count, or any configuration
/// question id is missing from the stored map. Stale sessions are fully
/// replaced, never merged: partial progress under mismatched question ids
/// would leave ghost answers behind.
#[must_use]
pub fn matches_configuration(state: &ExamSessionState, config: &ExamConfiguration) -> bool {
    state.exam_id == *config.id()
        && state.question_states.len() == config.total_questions()
        && config
            .question_ids()
            .all(|id| state.question_states.contains_key(id))
}
