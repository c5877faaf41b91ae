use async_trait::async_trait;
use chrono::{DateTime, Utc};
use curator_core::model::{
    ApprovalStatus, Assignment, Feedback, QuizId, ReviewerName, StarRating,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── OBJECTS ───────────────────────────────────────────────────────────────────
//

/// Metadata of a stored object (an uploaded CSV batch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub bucket: String,
    pub name: String,
    pub size: u64,
    pub updated_at: DateTime<Utc>,
}

/// An object ready to be written: validated key plus contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub meta: ObjectMeta,
    pub bytes: Vec<u8>,
}

impl StoredObject {
    /// # Errors
    ///
    /// Returns `StorageError::InvalidKey` if the bucket or object name is not valid.
    pub fn new(
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, StorageError> {
        validate_bucket(bucket)?;
        validate_object_name(name)?;
        Ok(Self {
            meta: ObjectMeta {
                bucket: bucket.to_owned(),
                name: name.to_owned(),
                size: bytes.len() as u64,
                updated_at,
            },
            bytes,
        })
    }
}

/// Buckets are non-empty and use lowercase ascii letters, digits, `-` and `_`.
///
/// # Errors
///
/// Returns `StorageError::InvalidKey` otherwise.
pub fn validate_bucket(bucket: &str) -> Result<(), StorageError> {
    let ok = !bucket.is_empty()
        && bucket
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(format!("bucket `{bucket}`")))
    }
}

/// Object names are non-empty, hold no path separators and are not `.`/`..`.
///
/// # Errors
///
/// Returns `StorageError::InvalidKey` otherwise.
pub fn validate_object_name(name: &str) -> Result<(), StorageError> {
    let ok = !name.trim().is_empty() && !name.contains(['/', '\\']) && name != "." && name != "..";
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(format!("object `{name}`")))
    }
}

/// Bucket-scoped blob storage for CSV batches.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List objects in a bucket, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the bucket name is invalid or the backend fails.
    async fn list(&self, bucket: &str) -> Result<Vec<ObjectMeta>, StorageError>;

    /// Store an object.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the object exists and `upsert` is false.
    async fn upload(&self, object: StoredObject, upsert: bool) -> Result<ObjectMeta, StorageError>;

    /// Read an object's contents.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing.
    async fn download(&self, bucket: &str, name: &str) -> Result<Vec<u8>, StorageError>;

    /// Move an object to a new name within its bucket.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if `from` is missing and
    /// `StorageError::Conflict` if `to` already exists.
    async fn rename(&self, bucket: &str, from: &str, to: &str) -> Result<ObjectMeta, StorageError>;

    /// Remove an object.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing.
    async fn delete(&self, bucket: &str, name: &str) -> Result<(), StorageError>;
}

//
// ─── FEEDBACK ──────────────────────────────────────────────────────────────────
//

/// Conjunctive filter over stored feedback; `None` fields match anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackFilter {
    pub quiz_id: Option<QuizId>,
    pub reviewer: Option<ReviewerName>,
    pub batch: Option<String>,
    pub approval: Option<ApprovalStatus>,
    /// Feedback without stars never passes a minimum.
    pub min_stars: Option<StarRating>,
}

impl FeedbackFilter {
    #[must_use]
    pub fn matches(&self, feedback: &Feedback) -> bool {
        self.quiz_id.as_ref().is_none_or(|id| &feedback.quiz_id == id)
            && self.reviewer.as_ref().is_none_or(|r| &feedback.reviewer == r)
            && self
                .batch
                .as_deref()
                .is_none_or(|b| feedback.batch.as_deref() == Some(b))
            && self.approval.is_none_or(|a| feedback.approval == a)
            && self
                .min_stars
                .is_none_or(|min| feedback.stars.is_some_and(|s| s >= min))
    }
}

/// Newest first, then by quiz id and reviewer.
pub(crate) fn sort_feedback(records: &mut [Feedback]) {
    records.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.quiz_id.as_str().cmp(b.quiz_id.as_str()))
            .then_with(|| a.reviewer.cmp(&b.reviewer))
    });
}

/// Repository contract for reviewer feedback, keyed by `(quiz_id, reviewer)`.
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Insert or replace the feedback for its `(quiz_id, reviewer)` pair.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the feedback cannot be stored.
    async fn upsert_feedback(&self, feedback: &Feedback) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_feedback(
        &self,
        quiz_id: &QuizId,
        reviewer: &ReviewerName,
    ) -> Result<Feedback, StorageError>;

    /// Feedback matching `filter`, newest update first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if rows cannot be read or decoded.
    async fn list_feedback(&self, filter: &FeedbackFilter) -> Result<Vec<Feedback>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing.
    async fn delete_feedback(
        &self,
        quiz_id: &QuizId,
        reviewer: &ReviewerName,
    ) -> Result<(), StorageError>;
}

//
// ─── ASSIGNMENTS ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentFilter {
    pub batch: Option<String>,
    pub reviewer: Option<ReviewerName>,
}

impl AssignmentFilter {
    #[must_use]
    pub fn matches(&self, assignment: &Assignment) -> bool {
        self.batch.as_deref().is_none_or(|b| assignment.batch == b)
            && self
                .reviewer
                .as_ref()
                .is_none_or(|r| &assignment.reviewer == r)
    }
}

/// Repository contract for batch-to-reviewer assignments.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Insert or replace the assignment for its `(batch, reviewer)` pair.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the assignment cannot be stored.
    async fn upsert_assignment(&self, assignment: &Assignment) -> Result<(), StorageError>;

    /// Assignments matching `filter`, ordered by batch then reviewer.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if rows cannot be read or decoded.
    async fn list_assignments(
        &self,
        filter: &AssignmentFilter,
    ) -> Result<Vec<Assignment>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing.
    async fn delete_assignment(
        &self,
        batch: &str,
        reviewer: &ReviewerName,
    ) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

type ObjectKey = (String, String);
type FeedbackKey = (QuizId, ReviewerName);
type AssignmentKey = (String, ReviewerName);

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    objects: Arc<Mutex<HashMap<ObjectKey, StoredObject>>>,
    feedback: Arc<Mutex<HashMap<FeedbackKey, Feedback>>>,
    assignments: Arc<Mutex<HashMap<AssignmentKey, Assignment>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn object_key(bucket: &str, name: &str) -> ObjectKey {
    (bucket.to_owned(), name.to_owned())
}

#[async_trait]
impl ObjectStore for InMemoryRepository {
    async fn list(&self, bucket: &str) -> Result<Vec<ObjectMeta>, StorageError> {
        validate_bucket(bucket)?;
        let guard = self.objects.lock().map_err(poisoned)?;
        let mut out: Vec<ObjectMeta> = guard
            .values()
            .filter(|object| object.meta.bucket == bucket)
            .map(|object| object.meta.clone())
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn upload(&self, object: StoredObject, upsert: bool) -> Result<ObjectMeta, StorageError> {
        let mut guard = self.objects.lock().map_err(poisoned)?;
        let key = object_key(&object.meta.bucket, &object.meta.name);
        if !upsert && guard.contains_key(&key) {
            return Err(StorageError::Conflict);
        }
        let meta = object.meta.clone();
        guard.insert(key, object);
        Ok(meta)
    }

    async fn download(&self, bucket: &str, name: &str) -> Result<Vec<u8>, StorageError> {
        let guard = self.objects.lock().map_err(poisoned)?;
        guard
            .get(&object_key(bucket, name))
            .map(|object| object.bytes.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn rename(&self, bucket: &str, from: &str, to: &str) -> Result<ObjectMeta, StorageError> {
        validate_object_name(to)?;
        let mut guard = self.objects.lock().map_err(poisoned)?;
        if !guard.contains_key(&object_key(bucket, from)) {
            return Err(StorageError::NotFound);
        }
        if guard.contains_key(&object_key(bucket, to)) {
            return Err(StorageError::Conflict);
        }
        let mut object = guard
            .remove(&object_key(bucket, from))
            .ok_or(StorageError::NotFound)?;
        object.meta.name = to.to_owned();
        let meta = object.meta.clone();
        guard.insert(object_key(bucket, to), object);
        Ok(meta)
    }

    async fn delete(&self, bucket: &str, name: &str) -> Result<(), StorageError> {
        let mut guard = self.objects.lock().map_err(poisoned)?;
        guard
            .remove(&object_key(bucket, name))
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryRepository {
    async fn upsert_feedback(&self, feedback: &Feedback) -> Result<(), StorageError> {
        let mut guard = self.feedback.lock().map_err(poisoned)?;
        guard.insert(
            (feedback.quiz_id.clone(), feedback.reviewer.clone()),
            feedback.clone(),
        );
        Ok(())
    }

    async fn get_feedback(
        &self,
        quiz_id: &QuizId,
        reviewer: &ReviewerName,
    ) -> Result<Feedback, StorageError> {
        let guard = self.feedback.lock().map_err(poisoned)?;
        guard
            .get(&(quiz_id.clone(), reviewer.clone()))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_feedback(&self, filter: &FeedbackFilter) -> Result<Vec<Feedback>, StorageError> {
        let guard = self.feedback.lock().map_err(poisoned)?;
        let mut out: Vec<Feedback> = guard
            .values()
            .filter(|feedback| filter.matches(feedback))
            .cloned()
            .collect();
        sort_feedback(&mut out);
        Ok(out)
    }

    async fn delete_feedback(
        &self,
        quiz_id: &QuizId,
        reviewer: &ReviewerName,
    ) -> Result<(), StorageError> {
        let mut guard = self.feedback.lock().map_err(poisoned)?;
        guard
            .remove(&(quiz_id.clone(), reviewer.clone()))
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryRepository {
    async fn upsert_assignment(&self, assignment: &Assignment) -> Result<(), StorageError> {
        let mut guard = self.assignments.lock().map_err(poisoned)?;
        guard.insert(
            (assignment.batch.clone(), assignment.reviewer.clone()),
            assignment.clone(),
        );
        Ok(())
    }

    async fn list_assignments(
        &self,
        filter: &AssignmentFilter,
    ) -> Result<Vec<Assignment>, StorageError> {
        let guard = self.assignments.lock().map_err(poisoned)?;
        let mut out: Vec<Assignment> = guard
            .values()
            .filter(|assignment| filter.matches(assignment))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.batch.cmp(&b.batch).then_with(|| a.reviewer.cmp(&b.reviewer)));
        Ok(out)
    }

    async fn delete_assignment(
        &self,
        batch: &str,
        reviewer: &ReviewerName,
    ) -> Result<(), StorageError> {
        let mut guard = self.assignments.lock().map_err(poisoned)?;
        guard
            .remove(&(batch.to_owned(), reviewer.clone()))
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub objects: Arc<dyn ObjectStore>,
    pub feedback: Arc<dyn FeedbackRepository>,
    pub assignments: Arc<dyn AssignmentRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let objects: Arc<dyn ObjectStore> = Arc::new(repo.clone());
        let feedback: Arc<dyn FeedbackRepository> = Arc::new(repo.clone());
        let assignments: Arc<dyn AssignmentRepository> = Arc::new(repo);
        Self {
            objects,
            feedback,
            assignments,
        }
    }
}
