//! InferenceBackend trait definition.
//!
//! The core abstraction over the text-completion capability: given a
//! rendered prompt and a model identifier, return a completion. Uses native
//! async fn in traits (RPITIT, Rust 2024 edition); implementations live in
//! aide-infra.

use aide_types::llm::{BackendError, CompletionRequest, CompletionResponse};

/// Trait for inference backends (Ollama, or a scripted fake in tests).
///
/// Stateless from the caller's perspective: every call carries the full
/// prompt. The request timeout is part of the backend's own configuration.
pub trait InferenceBackend: Send + Sync {
    /// Human-readable backend name (e.g. "ollama").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, BackendError>> + Send;
}
