use std::sync::Arc;

use curator_core::model::{Assignment, ReviewerName};
use storage::repository::{AssignmentFilter, AssignmentRepository, ObjectStore};
use tracing::info;

use crate::Clock;
use crate::error::AssignmentError;

/// Hands stored batches to reviewers.
#[derive(Clone)]
pub struct AssignmentService {
    clock: Clock,
    assignments: Arc<dyn AssignmentRepository>,
    objects: Arc<dyn ObjectStore>,
    bucket: String,
}

impl AssignmentService {
    #[must_use]
    pub fn new(
        clock: Clock,
        assignments: Arc<dyn AssignmentRepository>,
        objects: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            clock,
            assignments,
            objects,
            bucket: bucket.into(),
        }
    }

    /// Assign an existing batch to a reviewer; re-assigning refreshes the timestamp.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentError::Invalid` for a blank reviewer,
    /// `AssignmentError::UnknownBatch` if the batch is not stored, and
    /// `AssignmentError::Storage` if persistence fails.
    pub async fn assign(&self, batch: &str, reviewer: &str) -> Result<Assignment, AssignmentError> {
        let reviewer = ReviewerName::new(reviewer).map_err(curator_core::Error::from)?;
        let known = self
            .objects
            .list(&self.bucket)
            .await?
            .iter()
            .any(|meta| meta.name == batch);
        if !known {
            return Err(AssignmentError::UnknownBatch(batch.to_string()));
        }

        let assignment = Assignment::new(batch, reviewer, self.clock.now());
        self.assignments.upsert_assignment(&assignment).await?;
        info!(batch, reviewer = %assignment.reviewer, "assigned batch");
        Ok(assignment)
    }

    /// # Errors
    ///
    /// Returns `AssignmentError::Storage` with `NotFound` if no such assignment exists.
    pub async fn unassign(&self, batch: &str, reviewer: &str) -> Result<(), AssignmentError> {
        let reviewer = ReviewerName::new(reviewer).map_err(curator_core::Error::from)?;
        self.assignments.delete_assignment(batch, &reviewer).await?;
        info!(batch, reviewer = %reviewer, "unassigned batch");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AssignmentError::Storage` if repository access fails.
    pub async fn list(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>, AssignmentError> {
        Ok(self.assignments.list_assignments(filter).await?)
    }
}
