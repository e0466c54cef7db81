//! Tooling Layer
//!
//! Command-line entry points and their text output.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands};
pub use format::{StatusEntry, StatusOutput};
