use curator_core::model::{Feedback, QuizId, ReviewerName};
use sqlx::{QueryBuilder, Sqlite};

use super::{
    SqliteRepository,
    mapping::{conn, map_feedback_row, stars_to_i64},
};
use crate::repository::{FeedbackFilter, FeedbackRepository, StorageError};

const SELECT_FEEDBACK: &str = r"
    SELECT quiz_id, reviewer, stars, approval, comment, batch, created_at, updated_at
    FROM feedback
";

#[async_trait::async_trait]
impl FeedbackRepository for SqliteRepository {
    async fn upsert_feedback(&self, feedback: &Feedback) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO feedback (
                    quiz_id, reviewer, stars, approval, comment, batch, created_at, updated_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(quiz_id, reviewer) DO UPDATE SET
                    stars = excluded.stars,
                    approval = excluded.approval,
                    comment = excluded.comment,
                    batch = excluded.batch,
                    created_at = excluded.created_at,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(feedback.quiz_id.as_str())
        .bind(feedback.reviewer.as_str())
        .bind(stars_to_i64(feedback.stars))
        .bind(feedback.approval.as_str())
        .bind(feedback.comment.as_deref())
        .bind(feedback.batch.as_deref())
        .bind(feedback.created_at)
        .bind(feedback.updated_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_feedback(
        &self,
        quiz_id: &QuizId,
        reviewer: &ReviewerName,
    ) -> Result<Feedback, StorageError> {
        let sql = format!("{SELECT_FEEDBACK} WHERE quiz_id = ?1 AND reviewer = ?2");
        let row = sqlx::query(&sql)
            .bind(quiz_id.as_str())
            .bind(reviewer.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        match row {
            Some(row) => map_feedback_row(&row),
            None => Err(StorageError::NotFound),
        }
    }

    async fn list_feedback(&self, filter: &FeedbackFilter) -> Result<Vec<Feedback>, StorageError> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_FEEDBACK);
        qb.push(" WHERE 1 = 1");
        if let Some(quiz_id) = &filter.quiz_id {
            qb.push(" AND quiz_id = ").push_bind(quiz_id.as_str().to_owned());
        }
        if let Some(reviewer) = &filter.reviewer {
            qb.push(" AND reviewer = ").push_bind(reviewer.as_str().to_owned());
        }
        if let Some(batch) = &filter.batch {
            qb.push(" AND batch = ").push_bind(batch.clone());
        }
        if let Some(approval) = filter.approval {
            qb.push(" AND approval = ").push_bind(approval.as_str());
        }
        if let Some(min) = filter.min_stars {
            qb.push(" AND stars >= ").push_bind(i64::from(min.value()));
        }
        qb.push(" ORDER BY updated_at DESC, quiz_id ASC, reviewer ASC");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_feedback_row).collect()
    }

    async fn delete_feedback(
        &self,
        quiz_id: &QuizId,
        reviewer: &ReviewerName,
    ) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM feedback WHERE quiz_id = ?1 AND reviewer = ?2")
            .bind(quiz_id.as_str())
            .bind(reviewer.as_str())
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
