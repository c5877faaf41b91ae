use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::feedback::ReviewerName;

/// A CSV batch handed to a reviewer.
///
/// Unique per `(batch, reviewer)`; re-assigning refreshes `assigned_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub batch: String,
    pub reviewer: ReviewerName,
    pub assigned_at: DateTime<Utc>,
}

impl Assignment {
    #[must_use]
    pub fn new(batch: impl Into<String>, reviewer: ReviewerName, assigned_at: DateTime<Utc>) -> Self {
        Self {
            batch: batch.into(),
            reviewer,
            assigned_at,
        }
    }
}
