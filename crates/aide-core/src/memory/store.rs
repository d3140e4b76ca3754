//! MemoryStore trait definition.
//!
//! CRUD plus merge-key lookup for long-term memory records. Uses native
//! async fn in traits (RPITIT, Rust 2024 edition); implementations live in
//! aide-infra (e.g. `SqliteMemoryStore`).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use aide_types::error::StoreError;
use aide_types::memory::{MemoryCategory, MemoryRecord};

/// Repository trait for long-term memory persistence.
///
/// `(category, normalized content)` is a soft-unique key: the extraction
/// pipeline checks `find_by_normalized_content` before creating, and
/// implementations are expected to back that with a unique constraint.
pub trait MemoryStore: Send + Sync {
    /// Persist a new memory record.
    fn create(
        &self,
        record: &MemoryRecord,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Fetch a record by id.
    fn get(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<MemoryRecord>, StoreError>> + Send;

    /// Replace a record's content, stamping `updated_at`. The category is
    /// immutable post-creation. Returns the updated record, or
    /// `StoreError::NotFound`.
    fn update(
        &self,
        id: &Uuid,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<MemoryRecord, StoreError>> + Send;

    /// Bump `updated_at` on an existing record (merge-update for a duplicate
    /// candidate).
    fn touch(
        &self,
        id: &Uuid,
        updated_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Delete a record by id. `StoreError::NotFound` if absent.
    fn delete(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// All records in one category, ascending `updated_at`.
    fn list_by_category(
        &self,
        category: MemoryCategory,
    ) -> impl std::future::Future<Output = Result<Vec<MemoryRecord>, StoreError>> + Send;

    /// All records across categories.
    fn list_all(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<MemoryRecord>, StoreError>> + Send;

    /// Look up a record by its merge key.
    fn find_by_normalized_content(
        &self,
        category: MemoryCategory,
        normalized: &str,
    ) -> impl std::future::Future<Output = Result<Option<MemoryRecord>, StoreError>> + Send;
}
