//! Command-line interface
//!
//! Thin wrapper over the engine: argument parsing, config merging, and
//! the Ctrl-C race. Kept out of the library's re-exported surface so
//! CLI dependencies never leak to programmatic consumers.

pub mod args;
pub mod commands;

pub use args::Cli;
pub use commands::{build_options, run_wait};
