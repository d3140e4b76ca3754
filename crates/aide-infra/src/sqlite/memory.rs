//! SQLite memory store implementation.
//!
//! Implements `MemoryStore` from `aide-core` using sqlx with split
//! read/write pools: raw queries, a private Row struct for SQLite-to-domain
//! mapping, writes on the writer pool, reads on the reader pool.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use aide_core::memory::MemoryStore;
use aide_types::error::StoreError;
use aide_types::memory::{MemoryCategory, MemoryRecord};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MemoryStore`.
pub struct SqliteMemoryStore {
    pool: DatabasePool,
}

impl SqliteMemoryStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row type for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct MemoryRecordRow {
    id: String,
    category: String,
    content: String,
    session_id: Option<String>,
    created_at: String,
    updated_at: String,
}

impl MemoryRecordRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            category: row.try_get("category")?,
            content: row.try_get("content")?,
            session_id: row.try_get("session_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_record(self) -> Result<MemoryRecord, StoreError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::Query(format!("invalid memory id: {e}")))?;
        let category: MemoryCategory =
            self.category.parse().map_err(StoreError::Query)?;
        let session_id = self
            .session_id
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|e| StoreError::Query(format!("invalid session_id: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;
        let updated_at = parse_datetime(&self.updated_at)?;

        Ok(MemoryRecord {
            id,
            category,
            content: self.content,
            session_id,
            created_at,
            updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

const SELECT_COLUMNS: &str =
    "SELECT id, category, content, session_id, created_at, updated_at FROM memories";

// ---------------------------------------------------------------------------
// MemoryStore implementation
// ---------------------------------------------------------------------------

impl MemoryStore for SqliteMemoryStore {
    async fn create(&self, record: &MemoryRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO memories (id, category, content, normalized_content, session_id, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(record.id.to_string())
        .bind(record.category.to_string())
        .bind(&record.content)
        .bind(record.normalized_content())
        .bind(record.session_id.map(|id| id.to_string()))
        .bind(format_datetime(&record.created_at))
        .bind(format_datetime(&record.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<MemoryRecord>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        row.map(|r| MemoryRecordRow::from_row(&r).map_err(|e| StoreError::Query(e.to_string())))
            .transpose()?
            .map(MemoryRecordRow::into_record)
            .transpose()
    }

    async fn update(
        &self,
        id: &Uuid,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<MemoryRecord, StoreError> {
        let folded = aide_types::memory::fold_whitespace(content);
        let normalized = aide_types::memory::normalize_content(content);

        let result = sqlx::query(
            "UPDATE memories SET content = ?, normalized_content = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&folded)
        .bind(&normalized)
        .bind(format_datetime(&updated_at))
        .bind(id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        self.get(id).await?.ok_or(StoreError::NotFound)
    }

    async fn touch(&self, id: &Uuid, updated_at: DateTime<Utc>) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE memories SET updated_at = ? WHERE id = ?")
            .bind(format_datetime(&updated_at))
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM memories WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_by_category(
        &self,
        category: MemoryCategory,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE category = ? ORDER BY updated_at ASC, id ASC"
        ))
        .bind(category.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        rows.iter()
            .map(|r| {
                MemoryRecordRow::from_row(r)
                    .map_err(|e| StoreError::Query(e.to_string()))?
                    .into_record()
            })
            .collect()
    }

    async fn list_all(&self) -> Result<Vec<MemoryRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} ORDER BY category ASC, updated_at ASC, id ASC"
        ))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        rows.iter()
            .map(|r| {
                MemoryRecordRow::from_row(r)
                    .map_err(|e| StoreError::Query(e.to_string()))?
                    .into_record()
            })
            .collect()
    }

    async fn find_by_normalized_content(
        &self,
        category: MemoryCategory,
        normalized: &str,
    ) -> Result<Option<MemoryRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE category = ? AND normalized_content = ?"
        ))
        .bind(category.to_string())
        .bind(normalized)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        row.map(|r| MemoryRecordRow::from_row(&r).map_err(|e| StoreError::Query(e.to_string())))
            .transpose()?
            .map(MemoryRecordRow::into_record)
            .transpose()
    }
}
