use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::assignment_service::AssignmentService;
use crate::config::CuratorConfig;
use crate::curation_service::CurationService;
use crate::error::AppServicesError;
use crate::feedback_service::FeedbackService;
use crate::preview_service::QuizPreviewService;
use crate::quiz_api::{QuizApiClient, QuizSource};

/// Assembles the app-facing services over one `Storage`.
#[derive(Clone)]
pub struct AppServices {
    curation: Arc<CurationService>,
    feedback: Arc<FeedbackService>,
    assignments: Arc<AssignmentService>,
    previews: Arc<QuizPreviewService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage at `config.db_url`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// embed base URL is unusable.
    pub async fn new_sqlite(config: &CuratorConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        let client = Arc::new(QuizApiClient::new(config.quiz_api.clone()));
        Self::from_storage(&storage, config, clock, client)
    }

    /// Wire services over an existing `Storage` and quiz source.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::EmbedUrl` if `config.embed_base_url` cannot
    /// be extended with quiz ids.
    pub fn from_storage(
        storage: &Storage,
        config: &CuratorConfig,
        clock: Clock,
        source: Arc<dyn QuizSource>,
    ) -> Result<Self, AppServicesError> {
        let curation = Arc::new(CurationService::new(
            clock,
            Arc::clone(&storage.objects),
            config.bucket.clone(),
        ));
        let feedback = Arc::new(FeedbackService::new(clock, Arc::clone(&storage.feedback)));
        let assignments = Arc::new(AssignmentService::new(
            clock,
            Arc::clone(&storage.assignments),
            Arc::clone(&storage.objects),
            config.bucket.clone(),
        ));
        let previews = Arc::new(QuizPreviewService::new(
            source,
            config.retry,
            &config.embed_base_url,
        )?);

        Ok(Self {
            curation,
            feedback,
            assignments,
            previews,
        })
    }

    #[must_use]
    pub fn curation(&self) -> Arc<CurationService> {
        Arc::clone(&self.curation)
    }

    #[must_use]
    pub fn feedback(&self) -> Arc<FeedbackService> {
        Arc::clone(&self.feedback)
    }

    #[must_use]
    pub fn assignments(&self) -> Arc<AssignmentService> {
        Arc::clone(&self.assignments)
    }

    #[must_use]
    pub fn previews(&self) -> Arc<QuizPreviewService> {
        Arc::clone(&self.previews)
    }
}
