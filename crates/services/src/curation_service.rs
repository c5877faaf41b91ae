use std::sync::Arc;

use curator_core::QuizCatalog;
use curator_core::csv::parse_quiz_rows;
use storage::repository::{ObjectMeta, ObjectStore, StoredObject};
use tracing::info;

use crate::Clock;
use crate::error::CurationError;

/// Result of storing a CSV batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchUpload {
    pub meta: ObjectMeta,
    pub quiz_count: usize,
}

/// Manages CSV batches in one bucket of the object store.
#[derive(Clone)]
pub struct CurationService {
    clock: Clock,
    objects: Arc<dyn ObjectStore>,
    bucket: String,
}

impl CurationService {
    #[must_use]
    pub fn new(clock: Clock, objects: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            clock,
            objects,
            bucket: bucket.into(),
        }
    }

    /// Store `csv` as batch `name` after checking it references at least one quiz.
    ///
    /// # Errors
    ///
    /// Returns `CurationError::NoQuizIds` if no row yields a quiz id.
    /// Returns `CurationError::Storage` with `Conflict` if the batch exists and
    /// `replace` is false, or for other storage failures.
    pub async fn upload_batch(
        &self,
        name: &str,
        csv: &str,
        replace: bool,
    ) -> Result<BatchUpload, CurationError> {
        let quiz_count = parse_quiz_rows(csv).len();
        if quiz_count == 0 {
            return Err(CurationError::NoQuizIds(name.to_string()));
        }

        let object = StoredObject::new(
            &self.bucket,
            name,
            csv.as_bytes().to_vec(),
            self.clock.now(),
        )?;
        let meta = self.objects.upload(object, replace).await?;
        info!(bucket = %self.bucket, batch = %meta.name, quiz_count, "uploaded batch");
        Ok(BatchUpload { meta, quiz_count })
    }

    /// # Errors
    ///
    /// Returns `CurationError::Storage` if listing fails.
    pub async fn list_batches(&self) -> Result<Vec<ObjectMeta>, CurationError> {
        Ok(self.objects.list(&self.bucket).await?)
    }

    /// Raw bytes of a stored batch.
    ///
    /// # Errors
    ///
    /// Returns `CurationError::Storage` with `NotFound` if the batch is missing.
    pub async fn download_batch(&self, name: &str) -> Result<Vec<u8>, CurationError> {
        Ok(self.objects.download(&self.bucket, name).await?)
    }

    /// Parse a stored batch into a browsable catalog.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns `CurationError::Storage` if the batch cannot be read.
    pub async fn load_batch(&self, name: &str) -> Result<QuizCatalog, CurationError> {
        let bytes = self.download_batch(name).await?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(QuizCatalog::from_csv(&text))
    }

    /// # Errors
    ///
    /// Returns `CurationError::Storage` with `NotFound` if `from` is missing or
    /// `Conflict` if `to` is taken.
    pub async fn rename_batch(&self, from: &str, to: &str) -> Result<ObjectMeta, CurationError> {
        let meta = self.objects.rename(&self.bucket, from, to).await?;
        info!(bucket = %self.bucket, from, to, "renamed batch");
        Ok(meta)
    }

    /// # Errors
    ///
    /// Returns `CurationError::Storage` with `NotFound` if the batch is missing.
    pub async fn delete_batch(&self, name: &str) -> Result<(), CurationError> {
        self.objects.delete(&self.bucket, name).await?;
        info!(bucket = %self.bucket, batch = name, "deleted batch");
        Ok(())
    }
}
