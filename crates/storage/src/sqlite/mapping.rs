use chrono::{DateTime, Utc};
use curator_core::model::{
    ApprovalStatus, Assignment, Feedback, QuizId, ReviewerName, StarRating,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{ObjectMeta, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Unique-key violations become `Conflict`; everything else is a connection error.
pub(crate) fn conflict_or_conn(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        _ => conn(e),
    }
}

pub(crate) fn size_to_i64(size: u64) -> Result<i64, StorageError> {
    i64::try_from(size).map_err(|_| StorageError::Serialization("object size overflow".into()))
}

pub(crate) fn stars_to_i64(stars: Option<StarRating>) -> Option<i64> {
    stars.map(|s| i64::from(s.value()))
}

fn stars_from_i64(value: Option<i64>) -> Result<Option<StarRating>, StorageError> {
    value
        .map(|v| {
            let raw = u8::try_from(v)
                .map_err(|_| StorageError::Serialization(format!("invalid stars: {v}")))?;
            StarRating::new(raw).map_err(ser)
        })
        .transpose()
}

pub(crate) fn map_object_row(row: &SqliteRow) -> Result<ObjectMeta, StorageError> {
    let size: i64 = row.try_get("size").map_err(ser)?;
    Ok(ObjectMeta {
        bucket: row.try_get("bucket").map_err(ser)?,
        name: row.try_get("name").map_err(ser)?,
        size: u64::try_from(size)
            .map_err(|_| StorageError::Serialization(format!("invalid size: {size}")))?,
        updated_at: row.try_get("updated_at").map_err(ser)?,
    })
}

pub(crate) fn map_feedback_row(row: &SqliteRow) -> Result<Feedback, StorageError> {
    let quiz_id = QuizId::new(row.try_get::<String, _>("quiz_id").map_err(ser)?).map_err(ser)?;
    let reviewer =
        ReviewerName::new(row.try_get::<String, _>("reviewer").map_err(ser)?).map_err(ser)?;
    let approval_str: String = row.try_get("approval").map_err(ser)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(ser)?;

    Ok(Feedback {
        quiz_id,
        reviewer,
        stars: stars_from_i64(row.try_get("stars").map_err(ser)?)?,
        approval: ApprovalStatus::parse(&approval_str).map_err(ser)?,
        comment: row.try_get("comment").map_err(ser)?,
        batch: row.try_get("batch").map_err(ser)?,
        created_at,
        updated_at: row.try_get("updated_at").map_err(ser)?,
    })
}

pub(crate) fn map_assignment_row(row: &SqliteRow) -> Result<Assignment, StorageError> {
    let reviewer =
        ReviewerName::new(row.try_get::<String, _>("reviewer").map_err(ser)?).map_err(ser)?;
    Ok(Assignment {
        batch: row.try_get("batch").map_err(ser)?,
        reviewer,
        assigned_at: row.try_get("assigned_at").map_err(ser)?,
    })
}
