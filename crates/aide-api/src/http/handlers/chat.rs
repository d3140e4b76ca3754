//! Chat handlers: user messages in, assistant replies out, plus the
//! introspection view of the exact prompt a session would send.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aide_core::prompt::DebugView;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for sending a chat message.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Conversation identifier. Callers that only ever run one conversation
    /// can omit it.
    #[serde(default = "default_session_id")]
    pub session_id: String,
    /// The user's message.
    pub message: String,
}

fn default_session_id() -> String {
    "default".to_string()
}

/// Response body for a chat message.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
}

/// POST /api/chat - Send a user message, receive the assistant's reply.
pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatResponse>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if body.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let reply = state
        .assistant
        .handle_user_message(&body.session_id, &body.message)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        ChatResponse {
            session_id: body.session_id,
            reply,
        },
        request_id,
        elapsed,
    )))
}

/// GET /api/chat/{session_id}/introspection - The exact prompt the session
/// would send to the backend right now, with its structured breakdown.
pub async fn get_introspection(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<DebugView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let view = state.assistant.introspect(&session_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(view, request_id, elapsed)))
}
