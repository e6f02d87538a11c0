mod answer;
mod exam;
mod ids;
mod question_set;
mod session;

pub use answer::Answer;
pub use exam::{
    ExamConfigError, ExamConfiguration, ExamConfigurationDraft, Question, QuestionType, Section,
};
pub use ids::{ExamId, QuestionId, QuestionSetId, SectionId};
pub use question_set::QuestionSet;
pub use session::{ExamSessionState, QuestionState};
