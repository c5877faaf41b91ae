//! Shared error types for the services crate.

use thiserror::Error;

use curator_core::model::QuizId;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted while reading configuration from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got `{value}`")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var} is not a valid http(s) url: `{value}`")]
    InvalidUrl { var: &'static str, value: String },
    #[error(transparent)]
    Bucket(#[from] StorageError),
}

/// Errors emitted by the quiz service client and `QuizPreviewService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizApiError {
    #[error("quiz service is not configured (set CURATOR_QUIZ_API_BASE_URL and CURATOR_QUIZ_API_KEY)")]
    NotConfigured,
    #[error("quiz {0} was not found")]
    NotFound(QuizId),
    #[error("quiz service returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected quiz service response: {0}")]
    Decode(String),
    #[error("invalid quiz service url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl QuizApiError {
    /// Network failures are worth retrying; everything else is final.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for QuizApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Errors emitted by `CurationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CurationError {
    #[error("no quiz ids found in `{0}`")]
    NoQuizIds(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `FeedbackService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeedbackServiceError {
    #[error(transparent)]
    Invalid(#[from] curator_core::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AssignmentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssignmentError {
    #[error("batch `{0}` does not exist")]
    UnknownBatch(String),
    #[error(transparent)]
    Invalid(#[from] curator_core::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid embed base url: {0}")]
    EmbedUrl(#[from] url::ParseError),
}
