//! Inference backend implementations.

pub mod ollama;
