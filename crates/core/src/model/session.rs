use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::model::answer::Answer;
use crate::model::exam::ExamConfiguration;
use crate::model::ids::{ExamId, QuestionId};
use crate::status::{QuestionStatus, derive_status};

//
// ─── QUESTION STATE ────────────────────────────────────────────────────────────
//

/// Per-question tracking flags for one attempt.
///
/// The display status is never stored; it is always derived from these
/// flags on read, so flags and status cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuestionState {
    /// True once the candidate has navigated to this question. Never reverts.
    pub is_visited: bool,
    /// True once an answer was committed through a save operation.
    pub is_saved: bool,
    pub selected_answer: Option<Answer>,
    /// Candidate-flagged intent to revisit, independent of answer state.
    pub marked_for_review: bool,
    /// Accumulated seconds on this question, tracked by the caller.
    pub time_taken_secs: u32,
}

impl QuestionState {
    /// Display status, recomputed from the flags on every call.
    #[must_use]
    pub fn status(&self) -> QuestionStatus {
        derive_status(self)
    }
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// Canonical state of one candidate's attempt at one exam configuration.
///
/// Owned exclusively by the session store; every other component reads a
/// snapshot and issues mutation requests.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamSessionState {
    pub exam_id: ExamId,
    /// Distinguishes one fresh attempt from the next in persisted history.
    pub attempt_id: Uuid,
    pub current_question_index: usize,
    pub current_section_index: usize,
    /// Keys are exactly the question ids of the configuration.
    pub question_states: BTreeMap<QuestionId, QuestionState>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub remaining_seconds: u32,
    pub language: String,
    pub is_submitted: bool,
    pub is_paused: bool,
}

impl ExamSessionState {
    /// Fresh state for a configuration: nothing visited, position at the
    /// first question, the full duration on the clock.
    #[must_use]
    pub fn fresh(config: &ExamConfiguration, now: DateTime<Utc>) -> Self {
        let question_states = config
            .question_ids()
            .map(|id| (id.clone(), QuestionState::default()))
            .collect();

        Self {
            exam_id: config.id().clone(),
            attempt_id: Uuid::new_v4(),
            current_question_index: 0,
            current_section_index: 0,
            question_states,
            start_time: now,
            end_time: now + Duration::minutes(i64::from(config.duration_minutes())),
            remaining_seconds: config.duration_minutes() * 60,
            language: config.languages().first().cloned().unwrap_or_default(),
            is_submitted: false,
            is_paused: false,
        }
    }

    /// State of one question by id.
    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&QuestionState> {
        self.question_states.get(id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
