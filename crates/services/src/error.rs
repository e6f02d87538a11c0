//! Shared error types for the services crate.

use thiserror::Error;

/// Errors emitted by the question-set resolver.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionSetError {
    #[error("question set request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
