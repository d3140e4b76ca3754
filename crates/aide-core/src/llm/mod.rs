//! Inference backend contract for Aide.
//!
//! This module defines the `InferenceBackend` trait that the infrastructure
//! layer implements (e.g. the Ollama backend), and the `BoxInferenceBackend`
//! wrapper enabling dynamic dispatch.

pub mod backend;
pub mod box_backend;

pub use backend::InferenceBackend;
pub use box_backend::BoxInferenceBackend;
