use curator_core::model::{Assignment, ReviewerName};
use sqlx::{QueryBuilder, Sqlite};

use super::{
    SqliteRepository,
    mapping::{conn, map_assignment_row},
};
use crate::repository::{AssignmentFilter, AssignmentRepository, StorageError};

#[async_trait::async_trait]
impl AssignmentRepository for SqliteRepository {
    async fn upsert_assignment(&self, assignment: &Assignment) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO assignments (batch, reviewer, assigned_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(batch, reviewer) DO UPDATE SET
                    assigned_at = excluded.assigned_at
            ",
        )
        .bind(&assignment.batch)
        .bind(assignment.reviewer.as_str())
        .bind(assignment.assigned_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn list_assignments(
        &self,
        filter: &AssignmentFilter,
    ) -> Result<Vec<Assignment>, StorageError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT batch, reviewer, assigned_at FROM assignments WHERE 1 = 1",
        );
        if let Some(batch) = &filter.batch {
            qb.push(" AND batch = ").push_bind(batch.clone());
        }
        if let Some(reviewer) = &filter.reviewer {
            qb.push(" AND reviewer = ").push_bind(reviewer.as_str().to_owned());
        }
        qb.push(" ORDER BY batch ASC, reviewer ASC");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_assignment_row).collect()
    }

    async fn delete_assignment(
        &self,
        batch: &str,
        reviewer: &ReviewerName,
    ) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM assignments WHERE batch = ?1 AND reviewer = ?2")
            .bind(batch)
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
