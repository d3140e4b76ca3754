//! Inference backend request/response types for Aide.
//!
//! The backend contract is deliberately small: given a rendered prompt and a
//! model identifier, return a completion. Prompt assembly happens upstream,
//! so a request carries one prompt string rather than a message list.

use serde::{Deserialize, Serialize};

/// Request to the inference backend for a completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    /// The fully rendered prompt (instruction header, long-term memory,
    /// session turns). Built by the prompt assembler.
    pub prompt: String,
    /// Ask the backend to constrain output to JSON. Used by the extraction
    /// pipeline; reply generation leaves this off.
    #[serde(default)]
    pub json_format: bool,
}

/// Response from the inference backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub model: String,
    pub content: String,
}

/// Errors from inference backend operations.
///
/// Both reply generation and extraction recover from these locally: the reply
/// path substitutes a fixed fallback message, the extraction path skips the
/// cycle. Neither surfaces a raw backend error to the user.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend timed out after {0}s")]
    Timeout(u64),

    #[error("invalid backend response: {0}")]
    InvalidResponse(String),
}
