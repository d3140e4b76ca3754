//! Short-term session context for Aide.
//!
//! This module owns the state machine deciding when the current conversation
//! has ended: `Active --[idle timeout OR trigger phrase]--> Expired`, with
//! expiry computed lazily from stored timestamps rather than a background
//! timer.

pub mod context;

pub use context::{SessionContext, SessionPolicy};
