use thiserror::Error;

use crate::model::ExamConfigError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    ExamConfig(#[from] ExamConfigError),
}
