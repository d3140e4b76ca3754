//! Shared domain types for Aide.
//!
//! This crate contains the core domain types used across the assistant:
//! conversation turns, session state, memory records, inference backend
//! request/response shapes, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
