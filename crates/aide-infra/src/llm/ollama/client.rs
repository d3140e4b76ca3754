//! OllamaBackend -- concrete [`InferenceBackend`] implementation for a local
//! Ollama server.
//!
//! Sends requests to `POST /api/generate` with streaming disabled. The
//! per-request timeout is set on the HTTP client at construction, so a slow
//! model surfaces as `BackendError::Timeout` rather than an indefinite hang.

use std::time::Duration;

use aide_core::llm::InferenceBackend;
use aide_types::llm::{BackendError, CompletionRequest, CompletionResponse};

use super::types::{OllamaGenerateRequest, OllamaGenerateResponse};

/// Ollama inference backend.
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl OllamaBackend {
    /// Create a new Ollama backend.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Ollama server base URL (e.g. "http://localhost:11434")
    /// * `timeout` - per-request timeout for completions
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs: timeout.as_secs(),
        }
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Convert a generic [`CompletionRequest`] into the Ollama wire shape.
    fn to_ollama_request(&self, request: &CompletionRequest) -> OllamaGenerateRequest {
        OllamaGenerateRequest {
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            stream: false,
            format: request.json_format.then(|| "json".to_string()),
        }
    }

    fn map_transport_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout(self.timeout_secs)
        } else {
            BackendError::Unavailable(e.to_string())
        }
    }
}

impl InferenceBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, BackendError> {
        let body = self.to_ollama_request(request);
        let url = self.url("/api/generate");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(BackendError::Unavailable(format!(
                "HTTP {status}: {error_body}"
            )));
        }

        let ollama_resp: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("failed to parse response: {e}")))?;

        Ok(CompletionResponse {
            model: ollama_resp.model,
            content: ollama_resp.response,
        })
    }
}
