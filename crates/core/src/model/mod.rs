mod assignment;
mod feedback;
mod ids;
mod quiz;

pub use assignment::Assignment;
pub use feedback::{
    ApprovalStatus, Feedback, FeedbackDraft, FeedbackError, ReviewerName, StarRating,
};
pub use ids::{ParseIdError, QuizId};
pub use quiz::QuizRecord;
