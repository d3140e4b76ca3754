//! Infrastructure layer for Aide.
//!
//! Contains implementations of the contract traits defined in `aide-core`:
//! SQLite-backed memory storage and the Ollama inference backend, plus
//! configuration and data-directory resolution.

pub mod config;
pub mod llm;
pub mod sqlite;
