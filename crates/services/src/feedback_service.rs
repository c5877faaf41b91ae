use std::sync::Arc;

use curator_core::export::feedback_csv;
use curator_core::model::{Feedback, FeedbackDraft, QuizId, ReviewerName};
use storage::repository::{FeedbackFilter, FeedbackRepository, StorageError};
use tracing::info;

use crate::Clock;
use crate::error::FeedbackServiceError;

/// Records reviewer ratings and approvals, one per `(quiz, reviewer)`.
#[derive(Clone)]
pub struct FeedbackService {
    clock: Clock,
    feedback: Arc<dyn FeedbackRepository>,
}

impl FeedbackService {
    #[must_use]
    pub fn new(clock: Clock, feedback: Arc<dyn FeedbackRepository>) -> Self {
        Self { clock, feedback }
    }

    /// Validate and store feedback, replacing the reviewer's earlier
    /// submission for the same quiz while keeping its `created_at`.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackServiceError::Invalid` for a blank reviewer or stars
    /// outside 1..=5.
    /// Returns `FeedbackServiceError::Storage` if persistence fails.
    pub async fn submit(
        &self,
        quiz_id: QuizId,
        draft: FeedbackDraft,
    ) -> Result<Feedback, FeedbackServiceError> {
        let feedback = Feedback::from_draft(quiz_id, draft, self.clock.now())
            .map_err(curator_core::Error::from)?;

        let feedback = match self
            .feedback
            .get_feedback(&feedback.quiz_id, &feedback.reviewer)
            .await
        {
            Ok(previous) => feedback.superseding(&previous),
            Err(StorageError::NotFound) => feedback,
            Err(err) => return Err(err.into()),
        };

        self.feedback.upsert_feedback(&feedback).await?;
        info!(
            quiz_id = %feedback.quiz_id,
            reviewer = %feedback.reviewer,
            approval = %feedback.approval,
            "recorded feedback"
        );
        Ok(feedback)
    }

    /// Returns `Ok(None)` when the reviewer has not rated the quiz.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackServiceError::Storage` if repository access fails.
    pub async fn get(
        &self,
        quiz_id: &QuizId,
        reviewer: &ReviewerName,
    ) -> Result<Option<Feedback>, FeedbackServiceError> {
        match self.feedback.get_feedback(quiz_id, reviewer).await {
            Ok(feedback) => Ok(Some(feedback)),
            Err(StorageError::NotFound) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// # Errors
    ///
    /// Returns `FeedbackServiceError::Storage` if repository access fails.
    pub async fn list(
        &self,
        filter: &FeedbackFilter,
    ) -> Result<Vec<Feedback>, FeedbackServiceError> {
        Ok(self.feedback.list_feedback(filter).await?)
    }

    /// # Errors
    ///
    /// Returns `FeedbackServiceError::Storage` with `NotFound` if there is
    /// nothing to delete.
    pub async fn delete(
        &self,
        quiz_id: &QuizId,
        reviewer: &ReviewerName,
    ) -> Result<(), FeedbackServiceError> {
        self.feedback.delete_feedback(quiz_id, reviewer).await?;
        Ok(())
    }

    /// Filtered feedback as CSV; empty when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackServiceError::Storage` if repository access fails.
    pub async fn export_csv(&self, filter: &FeedbackFilter) -> Result<String, FeedbackServiceError> {
        let records = self.list(filter).await?;
        Ok(feedback_csv(&records))
    }
}
