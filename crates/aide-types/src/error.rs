use thiserror::Error;

use crate::llm::BackendError;

/// Errors from memory store operations (used by the trait definition in
/// aide-core; implementations live in aide-infra).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("record not found")]
    NotFound,
}

/// Errors from session context operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Append was called on an expired context. This is a sequencing bug in
    /// the caller: an expired context must be replaced, not written to.
    #[error("session context is expired")]
    Expired,
}

/// Errors from an extraction cycle.
///
/// Backend failures skip the cycle (non-fatal to conversation flow); store
/// failures propagate because long-term persistence actually broke.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors surfaced by the orchestrator to the transport layer.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("unknown session: '{0}'")]
    UnknownSession(String),
}
