use serde::{Deserialize, Serialize};

use crate::model::ids::QuizId;

/// Normalized representation of one CSV row referencing an externally hosted quiz.
///
/// Every classification field is optional; the tree builder synthesizes
/// review nodes for missing levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizRecord {
    pub id: QuizId,
    pub title: Option<String>,
    pub domain: Option<String>,
    pub topic: Option<String>,
    pub standard: Option<String>,
    pub description: Option<String>,
    pub question_count: u32,
    pub variety_tag: Option<String>,
    /// `None` means "no score", which sorts after every scored quiz.
    pub score: Option<f64>,
    pub subject: Option<String>,
    pub grade: Option<String>,
}

impl QuizRecord {
    /// A record carrying nothing but its id.
    #[must_use]
    pub fn bare(id: QuizId) -> Self {
        Self {
            id,
            title: None,
            domain: None,
            topic: None,
            standard: None,
            description: None,
            question_count: 0,
            variety_tag: None,
            score: None,
            subject: None,
            grade: None,
        }
    }

    /// Title shown in the tree and in search matching.
    ///
    /// Falls back to `Quiz <first 8 chars of id>...` when the CSV had no title.
    #[must_use]
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("Quiz {}...", self.id.prefix(8)),
        }
    }
}
