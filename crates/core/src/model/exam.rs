use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{ExamId, QuestionId, QuestionSetId, SectionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamConfigError {
    #[error("exam id cannot be empty")]
    EmptyExamId,

    #[error("exam duration must be > 0 minutes")]
    InvalidDuration,

    #[error("exam must contain at least one section")]
    NoSections,

    #[error("section '{0}' contains no questions")]
    EmptySection(SectionId),

    #[error("duplicate question id '{0}'")]
    DuplicateQuestionId(QuestionId),

    #[error("exam must support at least one language")]
    NoLanguages,
}

//
// ─── QUESTIONS AND SECTIONS ────────────────────────────────────────────────────
//

/// How a question is answered, which drives the answer shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    SingleChoice,
    MultiChoice,
    Numerical,
}

/// One question as supplied by the content source.
///
/// Scoring weights are carried for the submission collaborator; the engine
/// itself never computes marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub question_type: QuestionType,
    pub marks: f64,
    pub negative_marks: f64,
    /// Shared passage/puzzle block this question belongs to, if any.
    #[serde(default)]
    pub question_set: Option<QuestionSetId>,
}

/// An ordered group of questions within an exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub name: String,
    pub questions: Vec<Question>,
}

//
// ─── CONFIGURATION ─────────────────────────────────────────────────────────────
//

/// Unvalidated exam definition, as deserialized from the content source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamConfigurationDraft {
    pub id: ExamId,
    pub duration_minutes: u32,
    pub sections: Vec<Section>,
    #[serde(default)]
    pub instructions: Vec<String>,
    pub languages: Vec<String>,
}

impl ExamConfigurationDraft {
    /// Validate the draft into an immutable [`ExamConfiguration`].
    ///
    /// # Errors
    ///
    /// Returns `ExamConfigError` if the id or duration is unusable, any
    /// section is empty, a question id repeats across the exam, or no
    /// language is offered.
    pub fn validate(self) -> Result<ExamConfiguration, ExamConfigError> {
        if self.id.as_str().trim().is_empty() {
            return Err(ExamConfigError::EmptyExamId);
        }
        if self.duration_minutes == 0 {
            return Err(ExamConfigError::InvalidDuration);
        }
        if self.sections.is_empty() {
            return Err(ExamConfigError::NoSections);
        }
        if self.languages.is_empty() {
            return Err(ExamConfigError::NoLanguages);
        }

        let mut seen = HashSet::new();
        for section in &self.sections {
            if section.questions.is_empty() {
                return Err(ExamConfigError::EmptySection(section.id.clone()));
            }
            for question in &section.questions {
                if !seen.insert(question.id.clone()) {
                    return Err(ExamConfigError::DuplicateQuestionId(question.id.clone()));
                }
            }
        }

        Ok(ExamConfiguration {
            id: self.id,
            duration_minutes: self.duration_minutes,
            sections: self.sections,
            instructions: self.instructions,
            languages: self.languages,
        })
    }
}

/// Immutable exam definition the engine runs one attempt against.
///
/// Questions are addressed both by stable id and by a flat global index
/// across sections, in section order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamConfiguration {
    id: ExamId,
    duration_minutes: u32,
    sections: Vec<Section>,
    instructions: Vec<String>,
    languages: Vec<String>,
}

impl ExamConfiguration {
    #[must_use]
    pub fn id(&self) -> &ExamId {
        &self.id
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    #[must_use]
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Total question count across all sections.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.sections
            .iter()
            .map(|section| section.questions.len())
            .sum()
    }

    /// All question ids in global order.
    pub fn question_ids(&self) -> impl Iterator<Item = &QuestionId> {
        self.sections
            .iter()
            .flat_map(|section| section.questions.iter().map(|question| &question.id))
    }

    /// Question at a flat global index, if in range.
    #[must_use]
    pub fn question_at(&self, index: usize) -> Option<&Question> {
        self.sections
            .iter()
            .flat_map(|section| section.questions.iter())
            .nth(index)
    }

    /// Index of the section owning a flat global question index.
    ///
    /// Walks cumulative per-section counts: the first section whose running
    /// total exceeds the index owns it.
    #[must_use]
    pub fn section_of(&self, index: usize) -> Option<usize> {
        let mut cumulative = 0;
        for (section_index, section) in self.sections.iter().enumerate() {
            cumulative += section.questions.len();
            if index < cumulative {
                return Some(section_index);
            }
        }
        None
    }

    /// Flat global index of a section's first question.
    #[must_use]
    pub fn section_start(&self, section_index: usize) -> Option<usize> {
        if section_index >= self.sections.len() {
            return None;
        }
        Some(
            self.sections[..section_index]
                .iter()
                .map(|section| section.questions.len())
                .sum(),
        )
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
