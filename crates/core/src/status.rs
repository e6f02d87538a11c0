//! Display-status derivation for the question palette.

use serde::{Deserialize, Serialize};

use crate::model::QuestionState;

/// Palette status of a question, derived from its tracking flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionStatus {
    NotVisited,
    NotAnswered,
    Answered,
    MarkedForReview,
    AnsweredAndMarked,
}

/// Map tracking flags to a display status. First match wins.
///
/// Review intent dominates: a marked question shows as marked even when an
/// answer exists that was never committed through the save path. "Answered"
/// requires both the save commit flag and a genuinely non-empty answer.
#[must_use]
pub fn derive_status(question: &QuestionState) -> QuestionStatus {
    if !question.is_visited {
        return QuestionStatus::NotVisited;
    }

    let answered = question.is_saved
        && question
            .selected_answer
            .as_ref()
            .is_some_and(|answer| !answer.is_empty());

    if question.marked_for_review {
        if answered {
            QuestionStatus::AnsweredAndMarked
        } else {
            QuestionStatus::MarkedForReview
        }
    } else if answered {
        QuestionStatus::Answered
    } else {
        QuestionStatus::NotAnswered
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Answer;

    fn visited() -> QuestionState {
        QuestionState {
            is_visited: true,
            ..QuestionState::default()
        }
    }

    #[test]
    fn unvisited_dominates_everything() {
        let question = QuestionState {
            is_visited: false,
            is_saved: true,
            selected_answer: Some(Answer::single("opt-a")),
            marked_for_review: true,
            time_taken_secs: 0,
        };
        assert_eq!(derive_status(&question), QuestionStatus::NotVisited);
    }

    #[test]
    fn visited_without_answer_is_not_answered() {
        assert_eq!(derive_status(&visited()), QuestionStatus::NotAnswered);
    }

    #[test]
    fn saved_non_empty_answer_is_answered() {
        let question = QuestionState {
            is_saved: true,
            selected_answer: Some(Answer::single("opt-c")),
            ..visited()
        };
        assert_eq!(derive_status(&question), QuestionStatus::Answered);
    }

    #[test]
    fn saved_empty_answer_does_not_count() {
        let question = QuestionState {
            is_saved: true,
            selected_answer: Some(Answer::multiple(Vec::<String>::new())),
            ..visited()
        };
        assert_eq!(derive_status(&question), QuestionStatus::NotAnswered);
    }

    #[test]
    fn selected_but_never_saved_is_not_answered() {
        let question = QuestionState {
            selected_answer: Some(Answer::single("opt-a")),
            ..visited()
        };
        assert_eq!(derive_status(&question), QuestionStatus::NotAnswered);
    }

    #[test]
    fn review_intent_dominates_uncommitted_answer() {
        let question = QuestionState {
            marked_for_review: true,
            selected_answer: Some(Answer::single("opt-a")),
            ..visited()
        };
        assert_eq!(derive_status(&question), QuestionStatus::MarkedForReview);
    }

    #[test]
    fn marked_and_saved_with_answer_is_answered_and_marked() {
        let question = QuestionState {
            is_saved: true,
            selected_answer: Some(Answer::multiple(["opt-a", "opt-d"])),
            marked_for_review: true,
            ..visited()
        };
        assert_eq!(derive_status(&question), QuestionStatus::AnsweredAndMarked);
    }

    #[test]
    fn marked_with_saved_empty_answer_stays_marked() {
        let question = QuestionState {
            is_saved: true,
            selected_answer: Some(Answer::numerical("  ")),
            marked_for_review: true,
            ..visited()
        };
        assert_eq!(derive_status(&question), QuestionStatus::MarkedForReview);
    }
}
