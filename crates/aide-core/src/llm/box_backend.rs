//! BoxInferenceBackend -- object-safe dynamic dispatch wrapper for
//! InferenceBackend.
//!
//! 1. Define an object-safe `InferenceBackendDyn` trait with boxed futures
//! 2. Blanket-impl `InferenceBackendDyn` for all `T: InferenceBackend`
//! 3. `BoxInferenceBackend` wraps `Box<dyn InferenceBackendDyn>` and delegates
//!
//! The orchestrator shares one backend between the reply path and extraction
//! tasks spawned off the latency path, so the backend must live behind a
//! type-erased, `Arc`-friendly handle.

use std::future::Future;
use std::pin::Pin;

use aide_types::llm::{BackendError, CompletionRequest, CompletionResponse};

use super::backend::InferenceBackend;

/// Object-safe version of [`InferenceBackend`] with boxed futures.
///
/// Exists solely to enable dynamic dispatch; a blanket implementation is
/// provided for all types implementing `InferenceBackend`.
pub trait InferenceBackendDyn: Send + Sync {
    fn name(&self) -> &str;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, BackendError>> + Send + 'a>>;
}

impl<T: InferenceBackend> InferenceBackendDyn for T {
    fn name(&self) -> &str {
        InferenceBackend::name(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, BackendError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }
}

/// Type-erased inference backend for runtime selection.
///
/// Since `InferenceBackend` uses RPITIT it cannot be a trait object
/// directly; `BoxInferenceBackend` provides equivalent methods delegating to
/// the inner `InferenceBackendDyn` object.
pub struct BoxInferenceBackend {
    inner: Box<dyn InferenceBackendDyn + Send + Sync>,
}

impl BoxInferenceBackend {
    /// Wrap a concrete `InferenceBackend` in a type-erased box.
    pub fn new<T: InferenceBackend + 'static>(backend: T) -> Self {
        Self {
            inner: Box::new(backend),
        }
    }

    /// Human-readable backend name.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Send a completion request and receive the full response.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, BackendError> {
        self.inner.complete_boxed(request).await
    }
}
