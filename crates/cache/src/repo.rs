//! Repository for cached work metadata.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::WorkRow;
use dlorg_extract::models::{WorkId, WorkMetadata};
use exn::ResultExt;
use sqlx::SqlitePool;
use time::UtcDateTime;

/// Point lookups and inserts of [`WorkMetadata`] keyed by [`WorkId`].
///
/// Entries are insert-only: once metadata is stored for an identifier it is
/// the canonical value for the lifetime of the store. [`delete`](Self::delete)
/// exists so a caller can explicitly request a refetch.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Repository {
    /// Get the stored metadata for a work, if any.
    pub async fn get(&self, id: &WorkId) -> Result<Option<WorkMetadata>> {
        let row: Option<WorkRow> = sqlx::query_as(include_str!("../queries/get_work.sql"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(WorkMetadata::try_from).transpose()
    }

    /// Store metadata for a work.
    ///
    /// Returns `false` (and leaves the stored value untouched) if the work was
    /// already present.
    pub async fn insert(&self, metadata: &WorkMetadata) -> Result<bool> {
        let row = WorkRow::new(metadata, UtcDateTime::now());
        let result = sqlx::query(include_str!("../queries/insert_work.sql"))
            .bind(row.id)
            .bind(row.name)
            .bind(row.maker)
            .bind(row.series)
            .bind(row.fetched_at)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove the stored metadata for a work. Returns `true` if a row existed.
    pub async fn delete(&self, id: &WorkId) -> Result<bool> {
        let result = sqlx::query(include_str!("../queries/delete_work.sql"))
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of works in the cache.
    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_works.sql"))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("count"))
    }
}
