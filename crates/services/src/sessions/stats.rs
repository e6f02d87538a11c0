use exam_core::QuestionStatus;
use exam_core::model::ExamSessionState;

/// Counts of questions per derived status, for the palette legend.
///
/// Computed as a reduction over the same derivation the palette renders,
/// so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub answered: usize,
    pub not_answered: usize,
    pub not_visited: usize,
    pub marked_for_review: usize,
    pub answered_and_marked: usize,
}

impl SessionStats {
    #[must_use]
    pub fn from_state(state: &ExamSessionState) -> Self {
        let mut stats = Self::default();
        for question in state.question_states.values() {
            match question.status() {
                QuestionStatus::Answered => stats.answered += 1,
                QuestionStatus::NotAnswered => stats.not_answered += 1,
                QuestionStatus::NotVisited => stats.not_visited += 1,
                QuestionStatus::MarkedForReview => stats.marked_for_review += 1,
                QuestionStatus::AnsweredAndMarked => stats.answered_and_marked += 1,
            }
        }
        stats
    }

    /// Sum across all buckets; always equals the total question count.
    #[must_use]
    pub fn total(&self) -> usize {
        self.answered
            + self.not_answered
            + self.not_visited
            + self.marked_for_review
            + self.answered_and_marked
    }
}
