//! Wire types for the Ollama generate API.

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct OllamaGenerateRequest {
    pub model: String,
    pub prompt: String,
    /// Always false: the assistant consumes completions whole.
    pub stream: bool,
    /// `Some("json")` enables Ollama's JSON mode for models that support it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Response body for a non-streaming `POST /api/generate`.
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaGenerateResponse {
    pub model: String,
    pub response: String,
    #[serde(default)]
    pub done: bool,
}
