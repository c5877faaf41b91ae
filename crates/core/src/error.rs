use thiserror::Error;

use crate::model::{FeedbackError, ParseIdError};

/// Validation failures from the domain model.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    QuizId(#[from] ParseIdError),
    #[error(transparent)]
    Feedback(#[from] FeedbackError),
}
