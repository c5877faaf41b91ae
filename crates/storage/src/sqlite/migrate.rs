use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use super::SqliteInitError;

/// Applies pending schema versions, each inside its own transaction.
///
/// Version 1 creates the batch objects, feedback and assignment tables.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS objects (
                    bucket TEXT NOT NULL,
                    name TEXT NOT NULL,
                    size INTEGER NOT NULL CHECK (size >= 0),
                    bytes BLOB NOT NULL,
                    updated_at TEXT NOT NULL,
                    PRIMARY KEY (bucket, name)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS feedback (
                    quiz_id TEXT NOT NULL,
                    reviewer TEXT NOT NULL,
                    stars INTEGER CHECK (stars BETWEEN 1 AND 5),
                    approval TEXT NOT NULL
                        CHECK (approval IN ('pending', 'approved', 'rejected')),
                    comment TEXT,
                    batch TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    PRIMARY KEY (quiz_id, reviewer)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS assignments (
                    batch TEXT NOT NULL,
                    reviewer TEXT NOT NULL,
                    assigned_at TEXT NOT NULL,
                    PRIMARY KEY (batch, reviewer)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_feedback_batch_updated
                    ON feedback (batch, updated_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_assignments_reviewer
                    ON assignments (reviewer, batch);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(version = 1, "applied schema migration");
    }

    Ok(())
}
