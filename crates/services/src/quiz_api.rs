use async_trait::async_trait;
use curator_core::model::QuizId;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::QuizApiConfig;
use crate::error::QuizApiError;

/// What the quiz service reports for one quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDetail {
    pub id: QuizId,
    pub name: String,
    pub question_count: u32,
    pub image_url: Option<String>,
    pub subject: Option<String>,
    pub grade: Option<String>,
}

/// Read-only access to the external quiz service.
#[async_trait]
pub trait QuizSource: Send + Sync {
    /// Fetch one quiz by id.
    ///
    /// # Errors
    ///
    /// Returns `QuizApiError::NotFound` if the service has no such quiz,
    /// `QuizApiError::Network` for transport failures, and other variants
    /// for configuration or protocol problems.
    async fn fetch_quiz(&self, id: &QuizId) -> Result<QuizDetail, QuizApiError>;
}

/// HTTP client for `GET {base_url}/quizzes/{id}`.
#[derive(Clone)]
pub struct QuizApiClient {
    client: Client,
    config: Option<QuizApiConfig>,
}

impl QuizApiClient {
    #[must_use]
    pub fn new(config: Option<QuizApiConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl QuizSource for QuizApiClient {
    async fn fetch_quiz(&self, id: &QuizId) -> Result<QuizDetail, QuizApiError> {
        let config = self.config.as_ref().ok_or(QuizApiError::NotConfigured)?;
        // "." and ".." cannot name a quiz and would vanish from the path.
        if is_dot_segment(id.as_str()) {
            return Err(QuizApiError::NotFound(id.clone()));
        }
        let url = quiz_url(&config.base_url, id)?;
        debug!(%url, "fetching quiz");

        let response = self
            .client
            .get(url)
            .bearer_auth(&config.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(QuizApiError::NotFound(id.clone()));
        }
        if !status.is_success() {
            return Err(QuizApiError::HttpStatus(status));
        }

        let body = response.bytes().await?;
        parse_quiz_body(id, &body)
    }
}

fn quiz_url(base_url: &str, id: &QuizId) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?;
    append_segments(&mut url, &["quizzes", id.as_str()])?;
    Ok(url)
}

/// Push `segments` onto the path of `url`, percent-encoding `/`, `?` and `#`
/// so an id can never leave its own segment.
pub(crate) fn append_segments(url: &mut Url, segments: &[&str]) -> Result<(), url::ParseError> {
    let mut path = url
        .path_segments_mut()
        .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
    path.pop_if_empty().extend(segments);
    Ok(())
}

pub(crate) fn is_dot_segment(segment: &str) -> bool {
    matches!(segment, "." | "..")
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuizEnvelope {
    Wrapped { data: QuizBody },
    Bare(QuizBody),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizBody {
    id: Option<String>,
    name: String,
    #[serde(default)]
    question_count: u32,
    image_url: Option<String>,
    subject: Option<String>,
    grade: Option<String>,
}

/// Decode a quiz response body, bare or wrapped in `{ "data": … }`.
///
/// The requested id is used when the body omits or blanks its own.
fn parse_quiz_body(requested: &QuizId, body: &[u8]) -> Result<QuizDetail, QuizApiError> {
    let envelope: QuizEnvelope =
        serde_json::from_slice(body).map_err(|e| QuizApiError::Decode(e.to_string()))?;
    let quiz = match envelope {
        QuizEnvelope::Wrapped { data } => data,
        QuizEnvelope::Bare(quiz) => quiz,
    };
    let id = match quiz.id {
        Some(raw) => QuizId::new(raw).unwrap_or_else(|_| requested.clone()),
        None => requested.clone(),
    };
    Ok(QuizDetail {
        id,
        name: quiz.name,
        question_count: quiz.question_count,
        image_url: quiz.image_url,
        subject: quiz.subject,
        grade: quiz.grade,
    })
}
