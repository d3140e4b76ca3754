//! CLI command definitions and dispatch for the `aide` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod memory;
pub mod status;

use clap::{Parser, Subcommand};

/// A personal assistant that remembers you.
#[derive(Parser)]
#[command(name = "aide", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value_t = 8000)]
        port: u16,

        /// Host to bind.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// List persisted memory records.
    #[command(alias = "ls")]
    Memories {
        /// Restrict to one category (attribute, goal, memory, request).
        #[arg(long)]
        category: Option<String>,
    },

    /// Show assistant status: record counts, data dir, configured model.
    Status,
}
