use std::collections::BTreeMap;

use exam_core::model::{Answer, ExamSessionState, QuestionId};

use super::stats::SessionStats;
use super::store::ExamSessionStore;

//
// ─── NAVIGATION / MUTATION OPERATIONS ──────────────────────────────────────────
//

/// All operations funnel through [`ExamSessionStore::update`], so each one
/// commits as a single snapshot. Out-of-range indices and unknown question
/// ids are silent no-ops: boundary taps from UI controls must neither crash
/// nor corrupt state, and an unknown id can only mean a configuration
/// mismatch the staleness guard already handles.
impl ExamSessionStore {
    /// Move to a question by flat global index, marking it visited.
    ///
    /// Visiting is idempotent: an already-visited destination keeps its
    /// flags untouched. The question navigated away from is not altered.
    pub async fn navigate_to_question(&mut self, index: usize) -> &ExamSessionState {
        let Some(section_index) = self.config().section_of(index) else {
            return self.snapshot();
        };
        let config = self.config_handle();

        self.update(move |state| {
            let mut next = state.clone();
            if let Some(question) = config.question_at(index) {
                if let Some(entry) = next.question_states.get_mut(&question.id) {
                    entry.is_visited = true;
                }
            }
            next.current_question_index = index;
            next.current_section_index = section_index;
            next
        })
        .await
    }

    /// Move to the first question of a section.
    pub async fn navigate_to_section(&mut self, section_index: usize) -> &ExamSessionState {
        let start = self.config().section_start(section_index);
        match start {
            Some(start) => self.navigate_to_question(start).await,
            None => self.snapshot(),
        }
    }

    pub async fn go_to_next(&mut self) -> &ExamSessionState {
        let next = self.snapshot().current_question_index + 1;
        self.navigate_to_question(next).await
    }

    pub async fn go_to_previous(&mut self) -> &ExamSessionState {
        let Some(previous) = self.snapshot().current_question_index.checked_sub(1) else {
            return self.snapshot();
        };
        self.navigate_to_question(previous).await
    }

    /// Commit an answer for a question without moving.
    ///
    /// Preserves the review mark.
    pub async fn save_answer(
        &mut self,
        question_id: &QuestionId,
        answer: Answer,
    ) -> &ExamSessionState {
        if !self.snapshot().question_states.contains_key(question_id) {
            return self.snapshot();
        }
        let question_id = question_id.clone();

        self.update(move |state| {
            let mut next = state.clone();
            if let Some(entry) = next.question_states.get_mut(&question_id) {
                entry.is_visited = true;
                entry.is_saved = true;
                entry.selected_answer = Some(answer);
            }
            next
        })
        .await
    }

    /// Commit an answer and move on, as one state transition.
    ///
    /// The source question's flags and the destination's visit land in the
    /// same snapshot; a rapid second action can never observe the answer
    /// committed but the navigation missing, or the reverse. When
    /// `next_index` is out of range the answer update still commits and the
    /// position stays where it was.
    pub async fn save_and_navigate(
        &mut self,
        question_id: &QuestionId,
        answer: Option<Answer>,
        mark_for_review: bool,
        next_index: usize,
    ) -> &ExamSessionState {
        if !self.snapshot().question_states.contains_key(question_id) {
            return self.snapshot();
        }
        let question_id = question_id.clone();
        let config = self.config_handle();

        self.update(move |state| {
            let mut next = state.clone();
            if let Some(entry) = next.question_states.get_mut(&question_id) {
                entry.is_visited = true;
                entry.is_saved = answer.is_some();
                entry.selected_answer = answer;
                entry.marked_for_review = mark_for_review;
            }

            if let Some(section_index) = config.section_of(next_index) {
                if let Some(question) = config.question_at(next_index) {
                    if let Some(entry) = next.question_states.get_mut(&question.id) {
                        entry.is_visited = true;
                    }
                }
                next.current_question_index = next_index;
                next.current_section_index = section_index;
            }
            next
        })
        .await
    }

    /// Mark for review and move on, recording whatever answer was present.
    pub async fn mark_and_navigate(
        &mut self,
        question_id: &QuestionId,
        answer: Option<Answer>,
        next_index: usize,
    ) -> &ExamSessionState {
        self.save_and_navigate(question_id, answer, true, next_index)
            .await
    }

    /// Drop a committed answer. The review mark is untouched.
    pub async fn clear_response(&mut self, question_id: &QuestionId) -> &ExamSessionState {
        if !self.snapshot().question_states.contains_key(question_id) {
            return self.snapshot();
        }
        let question_id = question_id.clone();

        self.update(move |state| {
            let mut next = state.clone();
            if let Some(entry) = next.question_states.get_mut(&question_id) {
                entry.is_visited = true;
                entry.is_saved = false;
                entry.selected_answer = None;
            }
            next
        })
        .await
    }

    /// Toggle the review mark on a question.
    pub async fn mark_for_review(&mut self, question_id: &QuestionId) -> &ExamSessionState {
        if !self.snapshot().question_states.contains_key(question_id) {
            return self.snapshot();
        }
        let question_id = question_id.clone();

        self.update(move |state| {
            let mut next = state.clone();
            if let Some(entry) = next.question_states.get_mut(&question_id) {
                entry.is_visited = true;
                entry.marked_for_review = !entry.marked_for_review;
            }
            next
        })
        .await
    }

    /// Store the externally tracked time spent on a question.
    pub async fn record_time_taken(
        &mut self,
        question_id: &QuestionId,
        seconds: u32,
    ) -> &ExamSessionState {
        if !self.snapshot().question_states.contains_key(question_id) {
            return self.snapshot();
        }
        let question_id = question_id.clone();

        self.update(move |state| {
            let mut next = state.clone();
            if let Some(entry) = next.question_states.get_mut(&question_id) {
                entry.time_taken_secs = seconds;
            }
            next
        })
        .await
    }

    /// Pause the attempt, snapshotting the remaining time.
    pub async fn pause_exam(&mut self, remaining_seconds: u32) -> &ExamSessionState {
        self.update(move |state| {
            let mut next = state.clone();
            next.is_paused = true;
            next.remaining_seconds = remaining_seconds;
            next
        })
        .await
    }

    pub async fn resume_exam(&mut self) -> &ExamSessionState {
        self.update(|state| {
            let mut next = state.clone();
            next.is_paused = false;
            next
        })
        .await
    }

    pub async fn set_language(&mut self, language: impl Into<String>) -> &ExamSessionState {
        let language = language.into();
        self.update(move |state| {
            let mut next = state.clone();
            next.language = language;
            next
        })
        .await
    }

    /// Final answer per question id for the scoring collaborator, `None`
    /// where nothing was answered.
    ///
    /// Does not set the submitted flag; the caller records that separately
    /// once scoring succeeds, via [`ExamSessionStore::mark_submitted`].
    #[must_use]
    pub fn submit_answers(&self) -> BTreeMap<QuestionId, Option<Answer>> {
        let state = self.snapshot();
        self.config()
            .question_ids()
            .map(|id| {
                let answer = state
                    .question(id)
                    .and_then(|question| question.selected_answer.clone());
                (id.clone(), answer)
            })
            .collect()
    }

    /// Record that the attempt was submitted.
    pub async fn mark_submitted(&mut self) -> &ExamSessionState {
        self.update(|state| {
            let mut next = state.clone();
            next.is_submitted = true;
            next
        })
        .await
    }

    /// Palette counts over the whole question set.
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats::from_state(self.snapshot())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
