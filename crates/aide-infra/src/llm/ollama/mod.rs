//! Ollama inference backend.
//!
//! Local model inference over the Ollama HTTP API. No API keys involved.

mod client;
mod types;

pub use client::OllamaBackend;
