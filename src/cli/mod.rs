//! CLI module for the treemirror tool.
//!
//! This module provides the command-line interface for planning and
//! executing mirror runs.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
