use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionSetId;

/// Shared passage or puzzle content rendered above a cluster of
/// sub-questions.
///
/// Content is immutable: the same id always maps to the same body, which
/// is what makes a late cache write after unmount harmless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub id: QuestionSetId,
    #[serde(default)]
    pub title: Option<String>,
    pub body: String,
}

impl QuestionSet {
    #[must_use]
    pub fn new(id: impl Into<QuestionSetId>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
