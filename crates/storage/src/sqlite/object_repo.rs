use super::{
    SqliteRepository,
    mapping::{conflict_or_conn, conn, map_object_row, size_to_i64},
};
use crate::repository::{
    ObjectMeta, ObjectStore, StorageError, StoredObject, validate_bucket, validate_object_name,
};

#[async_trait::async_trait]
impl ObjectStore for SqliteRepository {
    async fn list(&self, bucket: &str) -> Result<Vec<ObjectMeta>, StorageError> {
        validate_bucket(bucket)?;
        let rows = sqlx::query(
            r"
                SELECT bucket, name, size, updated_at
                FROM objects
                WHERE bucket = ?1
                ORDER BY name ASC
            ",
        )
        .bind(bucket)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_object_row).collect()
    }

    async fn upload(&self, object: StoredObject, upsert: bool) -> Result<ObjectMeta, StorageError> {
        let sql = if upsert {
            r"
                INSERT INTO objects (bucket, name, size, bytes, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(bucket, name) DO UPDATE SET
                    size = excluded.size,
                    bytes = excluded.bytes,
                    updated_at = excluded.updated_at
            "
        } else {
            r"
                INSERT INTO objects (bucket, name, size, bytes, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
            "
        };

        sqlx::query(sql)
            .bind(&object.meta.bucket)
            .bind(&object.meta.name)
            .bind(size_to_i64(object.meta.size)?)
            .bind(&object.bytes)
            .bind(object.meta.updated_at)
            .execute(&self.pool)
            .await
            .map_err(conflict_or_conn)?;

        Ok(object.meta)
    }

    async fn download(&self, bucket: &str, name: &str) -> Result<Vec<u8>, StorageError> {
        let bytes: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT bytes FROM objects WHERE bucket = ?1 AND name = ?2")
                .bind(bucket)
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(conn)?;
        bytes.ok_or(StorageError::NotFound)
    }

    async fn rename(&self, bucket: &str, from: &str, to: &str) -> Result<ObjectMeta, StorageError> {
        validate_object_name(to)?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let source = sqlx::query("SELECT 1 FROM objects WHERE bucket = ?1 AND name = ?2")
            .bind(bucket)
            .bind(from)
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?;
        if source.is_none() {
            return Err(StorageError::NotFound);
        }

        // copy, then drop the source row
        sqlx::query(
            r"
                INSERT INTO objects (bucket, name, size, bytes, updated_at)
                SELECT bucket, ?3, size, bytes, updated_at
                FROM objects
                WHERE bucket = ?1 AND name = ?2
            ",
        )
        .bind(bucket)
        .bind(from)
        .bind(to)
        .execute(&mut *tx)
        .await
        .map_err(conflict_or_conn)?;

        sqlx::query("DELETE FROM objects WHERE bucket = ?1 AND name = ?2")
            .bind(bucket)
            .bind(from)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        let row = sqlx::query(
            r"
                SELECT bucket, name, size, updated_at
                FROM objects
                WHERE bucket = ?1 AND name = ?2
            ",
        )
        .bind(bucket)
        .bind(to)
        .fetch_one(&mut *tx)
        .await
        .map_err(conn)?;
        let meta = map_object_row(&row)?;

        tx.commit().await.map_err(conn)?;
        Ok(meta)
    }

    async fn delete(&self, bucket: &str, name: &str) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM objects WHERE bucket = ?1 AND name = ?2")
            .bind(bucket)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
