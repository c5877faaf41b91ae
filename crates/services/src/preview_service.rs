use std::sync::Arc;

use curator_core::model::QuizId;
use tracing::info;
use url::Url;

use crate::error::QuizApiError;
use crate::quiz_api::{QuizDetail, QuizSource, append_segments};
use crate::retry::RetryPolicy;

/// Outcome of one quiz in a batch fetch.
#[derive(Debug)]
pub struct QuizPreview {
    pub id: QuizId,
    pub embed_url: String,
    pub detail: Result<QuizDetail, QuizApiError>,
}

/// Fetches quiz details through a `QuizSource`, retrying network failures.
#[derive(Clone)]
pub struct QuizPreviewService {
    source: Arc<dyn QuizSource>,
    retry: RetryPolicy,
    embed_base: Url,
}

impl QuizPreviewService {
    /// # Errors
    ///
    /// Returns `url::ParseError` if `embed_base_url` is not an absolute URL
    /// that can take path segments.
    pub fn new(
        source: Arc<dyn QuizSource>,
        retry: RetryPolicy,
        embed_base_url: &str,
    ) -> Result<Self, url::ParseError> {
        let embed_base = Url::parse(embed_base_url)?;
        if embed_base.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        Ok(Self {
            source,
            retry,
            embed_base,
        })
    }

    /// Fetch one quiz.
    ///
    /// # Errors
    ///
    /// Returns the last `QuizApiError` once retries are exhausted; only
    /// `QuizApiError::Network` is retried.
    pub async fn fetch(&self, id: &QuizId) -> Result<QuizDetail, QuizApiError> {
        self.retry
            .run(|| self.source.fetch_quiz(id), QuizApiError::is_transient)
            .await
    }

    /// Fetch several quizzes one after another. A failing quiz is reported
    /// in its own entry and does not stop the rest.
    pub async fn fetch_many(&self, ids: &[QuizId]) -> Vec<QuizPreview> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let detail = self.fetch(id).await;
            out.push(QuizPreview {
                id: id.clone(),
                embed_url: self.preview_url(id),
                detail,
            });
        }
        let failed = out.iter().filter(|p| p.detail.is_err()).count();
        info!(requested = ids.len(), failed, "fetched quiz previews");
        out
    }

    /// Embeddable preview page for `id`.
    #[must_use]
    pub fn preview_url(&self, id: &QuizId) -> String {
        let mut url = self.embed_base.clone();
        // checked in `new`: the base always takes path segments
        if append_segments(&mut url, &[id.as_str()]).is_err() {
            return self.embed_base.to_string();
        }
        url.into()
    }
}
