use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;
use tracing::debug;

use crate::repository::{AssignmentRepository, FeedbackRepository, ObjectStore, Storage};

mod assignment_repo;
mod feedback_repo;
mod mapping;
mod migrate;
mod object_repo;

/// Pool size for the curator database; a CLI run needs very few.
const MAX_CONNECTIONS: u32 = 4;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Applied to every new connection. Batch blobs can be large, so writers
/// wait on the lock instead of failing fast.
const CONNECTION_PRAGMAS: &[&str] = &["PRAGMA journal_mode = WAL;", "PRAGMA busy_timeout = 5000;"];

/// Object, feedback and assignment storage over one `SQLite` pool.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error("cannot open curator database: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Open a pool on `database_url`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the database cannot be opened or one of
    /// the connection pragmas is rejected.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    for pragma in CONNECTION_PRAGMAS {
                        sqlx::query(pragma).execute(&mut *conn).await?;
                    }
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        debug!(database_url, "opened curator database");
        Ok(Self { pool })
    }

    /// Bring the schema up to the latest version.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Open and migrate `database_url`, sharing one pool across all three
    /// stores.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the database cannot be opened or migrated.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        let objects: Arc<dyn ObjectStore> = Arc::new(repo.clone());
        let feedback: Arc<dyn FeedbackRepository> = Arc::new(repo.clone());
        let assignments: Arc<dyn AssignmentRepository> = Arc::new(repo);
        Ok(Self {
            objects,
            feedback,
            assignments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteRepository>();
    }
}
