//! The assistant orchestrator: the single entry point tying together the
//! session context, prompt assembly, inference backend, and extraction
//! pipeline.

pub mod orchestrator;

pub use orchestrator::Assistant;
