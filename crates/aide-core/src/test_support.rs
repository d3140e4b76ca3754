//! Test doubles shared by unit tests across the crate.
//!
//! `InMemoryStore` is a vector-backed `MemoryStore`; `ScriptedBackend`
//! replays a queue of canned completions (or errors) in order.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use aide_types::error::StoreError;
use aide_types::llm::{BackendError, CompletionRequest, CompletionResponse};
use aide_types::memory::{MemoryCategory, MemoryRecord};

use crate::llm::InferenceBackend;
use crate::memory::MemoryStore;

/// Vector-backed memory store for tests.
pub struct InMemoryStore {
    records: tokio::sync::Mutex<Vec<MemoryRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: tokio::sync::Mutex::new(Vec::new()),
        }
    }

    /// All records, for assertions.
    pub async fn records(&self) -> Vec<MemoryRecord> {
        self.records.lock().await.clone()
    }
}

impl MemoryStore for InMemoryStore {
    async fn create(&self, record: &MemoryRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        let key = record.normalized_content();
        if records
            .iter()
            .any(|r| r.category == record.category && r.normalized_content() == key)
        {
            return Err(StoreError::Query("merge key violation".to_string()));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<MemoryRecord>, StoreError> {
        Ok(self.records.lock().await.iter().find(|r| r.id == *id).cloned())
    }

    async fn update(
        &self,
        id: &Uuid,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<MemoryRecord, StoreError> {
        let mut records = self.records.lock().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == *id)
            .ok_or(StoreError::NotFound)?;
        record.content = content.to_string();
        record.updated_at = updated_at;
        Ok(record.clone())
    }

    async fn touch(&self, id: &Uuid, updated_at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == *id)
            .ok_or(StoreError::NotFound)?;
        record.updated_at = updated_at;
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r.id != *id);
        if records.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_by_category(
        &self,
        category: MemoryCategory,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        let mut records: Vec<MemoryRecord> = self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.category == category)
            .cloned()
            .collect();
        records.sort_by_key(|r| (r.updated_at, r.id));
        Ok(records)
    }

    async fn list_all(&self) -> Result<Vec<MemoryRecord>, StoreError> {
        Ok(self.records.lock().await.clone())
    }

    async fn find_by_normalized_content(
        &self,
        category: MemoryCategory,
        normalized: &str,
    ) -> Result<Option<MemoryRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|r| r.category == category && r.normalized_content() == normalized)
            .cloned())
    }
}

/// Backend replaying canned completions in order. Panics when the script
/// runs dry: a test reaching the backend more often than scripted is a bug
/// in the test.
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<String, BackendError>>>,
}

impl ScriptedBackend {
    pub fn new(responses: Vec<Result<String, BackendError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

impl InferenceBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, BackendError> {
        let next = self
            .responses
            .lock()
            .expect("scripted backend lock")
            .pop_front()
            .expect("scripted backend ran out of responses");
        next.map(|content| CompletionResponse {
            model: request.model.clone(),
            content,
        })
    }
}
