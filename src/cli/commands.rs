//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Treemirror - deadline-bounded one-way directory mirroring.
#[derive(Parser, Debug)]
#[command(name = "treemirror")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, env = "TREEMIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new treemirror project.
    Init {
        /// Directory to initialize (defaults to current directory).
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Force overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the mirror configuration.
    Validate {
        /// Show all warnings, not just errors.
        #[arg(short, long)]
        warnings: bool,
    },

    /// Compute the sync plan and persist it.
    Plan {
        /// Source root (overrides the configuration file).
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Backup root (overrides the configuration file).
        #[arg(short, long)]
        backup: Option<PathBuf>,

        /// List every planned action, not just the summary.
        #[arg(short, long)]
        detailed: bool,
    },

    /// Execute a persisted sync plan under a deadline.
    Apply {
        /// Plan document to execute (defaults to the most recent).
        #[arg(long)]
        plan: Option<PathBuf>,

        /// Minutes after which no new phase or action may begin.
        #[arg(long)]
        deadline_minutes: Option<u64>,
    },

    /// Compute, persist, and execute a plan in one run.
    Sync {
        /// Source root (overrides the configuration file).
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Backup root (overrides the configuration file).
        #[arg(short, long)]
        backup: Option<PathBuf>,

        /// Minutes after which no new phase or action may begin.
        #[arg(long)]
        deadline_minutes: Option<u64>,
    },

    /// Show per-action outcomes of a persisted plan.
    Report {
        /// Plan document to inspect (defaults to the most recent).
        #[arg(long)]
        plan: Option<PathBuf>,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}
