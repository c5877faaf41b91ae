use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuizId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FeedbackError {
    #[error("reviewer name cannot be empty")]
    EmptyReviewer,

    #[error("star rating must be between 1 and 5, got {0}")]
    InvalidStars(u8),

    #[error("unknown approval status: {0}")]
    InvalidApproval(String),
}

//
// ─── REVIEWER ──────────────────────────────────────────────────────────────────
//

/// Validated reviewer name (trimmed, non-empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReviewerName(String);

impl ReviewerName {
    /// Create a validated reviewer name.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::EmptyReviewer` if the name is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, FeedbackError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FeedbackError::EmptyReviewer);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReviewerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ReviewerName {
    type Error = FeedbackError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReviewerName> for String {
    fn from(name: ReviewerName) -> Self {
        name.0
    }
}

//
// ─── RATING ────────────────────────────────────────────────────────────────────
//

/// One to five stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct StarRating(u8);

impl StarRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// # Errors
    ///
    /// Returns `FeedbackError::InvalidStars` outside `1..=5`.
    pub fn new(stars: u8) -> Result<Self, FeedbackError> {
        if (Self::MIN..=Self::MAX).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(FeedbackError::InvalidStars(stars))
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for StarRating {
    type Error = FeedbackError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StarRating> for u8 {
    fn from(rating: StarRating) -> Self {
        rating.0
    }
}

/// Curator decision on whether a quiz is fit for use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    /// # Errors
    ///
    /// Returns `FeedbackError::InvalidApproval` for unknown values.
    pub fn parse(value: &str) -> Result<Self, FeedbackError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(FeedbackError::InvalidApproval(other.to_string())),
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── FEEDBACK ──────────────────────────────────────────────────────────────────
//

/// Unvalidated feedback as typed by a reviewer.
#[derive(Debug, Clone, Default)]
pub struct FeedbackDraft {
    pub reviewer: String,
    pub stars: Option<u8>,
    pub approval: ApprovalStatus,
    pub comment: Option<String>,
    pub batch: Option<String>,
}

/// A reviewer's rating and approval decision for one quiz.
///
/// At most one feedback exists per `(quiz_id, reviewer)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub quiz_id: QuizId,
    pub reviewer: ReviewerName,
    pub stars: Option<StarRating>,
    pub approval: ApprovalStatus,
    pub comment: Option<String>,
    pub batch: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Feedback {
    /// Validate a draft into feedback stamped at `now`.
    ///
    /// Blank comments and batch names are dropped.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError` if the reviewer is blank or stars are out of range.
    pub fn from_draft(
        quiz_id: QuizId,
        draft: FeedbackDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, FeedbackError> {
        let reviewer = ReviewerName::new(draft.reviewer)?;
        let stars = draft.stars.map(StarRating::new).transpose()?;
        Ok(Self {
            quiz_id,
            reviewer,
            stars,
            approval: draft.approval,
            comment: non_blank(draft.comment),
            batch: non_blank(draft.batch),
            created_at: now,
            updated_at: now,
        })
    }

    /// Keep the original creation time when a reviewer resubmits.
    #[must_use]
    pub fn superseding(mut self, previous: &Feedback) -> Self {
        self.created_at = previous.created_at;
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn quiz() -> QuizId {
        QuizId::new("abcdef0123456789abcd").unwrap()
    }

    #[test]
    fn stars_out_of_range_are_rejected() {
        assert_eq!(StarRating::new(0), Err(FeedbackError::InvalidStars(0)));
        assert_eq!(StarRating::new(6), Err(FeedbackError::InvalidStars(6)));
        assert_eq!(StarRating::new(5).unwrap().value(), 5);
    }

    #[test]
    fn draft_requires_reviewer() {
        let draft = FeedbackDraft {
            reviewer: "  ".into(),
            ..FeedbackDraft::default()
        };
        let err = Feedback::from_draft(quiz(), draft, fixed_now()).unwrap_err();
        assert_eq!(err, FeedbackError::EmptyReviewer);
    }

    #[test]
    fn draft_drops_blank_comment() {
        let draft = FeedbackDraft {
            reviewer: "ana".into(),
            stars: Some(4),
            comment: Some("   ".into()),
            approval: ApprovalStatus::Approved,
            ..FeedbackDraft::default()
        };
        let feedback = Feedback::from_draft(quiz(), draft, fixed_now()).unwrap();
        assert_eq!(feedback.comment, None);
        assert_eq!(feedback.stars.map(StarRating::value), Some(4));
        assert_eq!(feedback.reviewer.as_str(), "ana");
    }

    #[test]
    fn approval_parses_case_insensitively() {
        assert_eq!(ApprovalStatus::parse("Approved").unwrap(), ApprovalStatus::Approved);
        assert!(ApprovalStatus::parse("maybe").is_err());
    }

    #[test]
    fn superseding_keeps_created_at() {
        let first = Feedback::from_draft(
            quiz(),
            FeedbackDraft {
                reviewer: "ana".into(),
                ..FeedbackDraft::default()
            },
            fixed_now(),
        )
        .unwrap();
        let later = fixed_now() + chrono::Duration::hours(2);
        let second = Feedback::from_draft(
            quiz(),
            FeedbackDraft {
                reviewer: "ana".into(),
                stars: Some(2),
                ..FeedbackDraft::default()
            },
            later,
        )
        .unwrap()
        .superseding(&first);
        assert_eq!(second.created_at, fixed_now());
        assert_eq!(second.updated_at, later);
    }
}
