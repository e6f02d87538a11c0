#![forbid(unsafe_code)]

pub mod error;
pub mod question_sets;
pub mod sessions;

pub use exam_core::Clock;

pub use error::QuestionSetError;
pub use question_sets::{
    HttpQuestionSetSource, QuestionSetCache, QuestionSetResolution, QuestionSetResolver,
    QuestionSetSource,
};
pub use sessions::{ExamSessionStore, SessionStats, matches_configuration};
