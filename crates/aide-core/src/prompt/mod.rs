//! Prompt assembly for Aide.
//!
//! Renders the text fed to the inference backend from persisted long-term
//! records and the live session snapshot, and serves the same text to the
//! introspection view.

pub mod assembler;

pub use assembler::{DebugView, PromptAssembler, PromptBreakdown};
