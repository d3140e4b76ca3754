//! Admin CRUD facade over the memory store.
//!
//! Direct passthrough for browsing and editing records; the extraction
//! pipeline remains the primary writer.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use aide_core::memory::MemoryStore;
use aide_types::memory::{fold_whitespace, MemoryCategory, MemoryRecord};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Query parameters for listing memories.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Restrict the listing to one category.
    pub category: Option<String>,
}

/// Request body for creating a memory record.
#[derive(Debug, Deserialize)]
pub struct CreateMemoryRequest {
    pub category: String,
    pub content: String,
}

/// Request body for updating a memory record. The category is immutable.
#[derive(Debug, Deserialize)]
pub struct UpdateMemoryRequest {
    pub content: String,
}

/// GET /api/memories[?category=] - List memory records.
pub async fn list_memories(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<MemoryRecord>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let records = match query.category.as_deref() {
        Some(raw) => {
            let category = parse_category(raw)?;
            state.store.list_by_category(category).await?
        }
        None => state.store.list_all().await?,
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(records, request_id, elapsed)))
}

/// POST /api/memories - Create a memory record manually.
pub async fn create_memory(
    State(state): State<AppState>,
    Json(body): Json<CreateMemoryRequest>,
) -> Result<Json<ApiResponse<MemoryRecord>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let category = parse_category(&body.category)?;
    let content = fold_whitespace(&body.content);
    if content.is_empty() {
        return Err(AppError::Validation("content must not be empty".to_string()));
    }

    let now = Utc::now();
    let record = MemoryRecord {
        id: Uuid::now_v7(),
        category,
        content,
        session_id: None,
        created_at: now,
        updated_at: now,
    };
    state.store.create(&record).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(record, request_id, elapsed)))
}

/// PUT /api/memories/{id} - Replace a record's content.
pub async fn update_memory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateMemoryRequest>,
) -> Result<Json<ApiResponse<MemoryRecord>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let content = fold_whitespace(&body.content);
    if content.is_empty() {
        return Err(AppError::Validation("content must not be empty".to_string()));
    }

    let record = state.store.update(&id, &content, Utc::now()).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(record, request_id, elapsed)))
}

/// DELETE /api/memories/{id} - Delete a record.
pub async fn delete_memory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    state.store.delete(&id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({"deleted": id.to_string()}),
        request_id,
        elapsed,
    )))
}

fn parse_category(raw: &str) -> Result<MemoryCategory, AppError> {
    raw.parse::<MemoryCategory>()
        .map_err(AppError::Validation)
}
