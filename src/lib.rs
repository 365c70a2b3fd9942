// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Treemirror
//!
//! Deadline-bounded one-way directory mirroring with durable, resumable
//! sync plans.
//!
//! ## Overview
//!
//! Treemirror replicates a source directory tree onto a backup tree, with
//! the source authoritative:
//!
//! - Compute a change plan (create/copy/update/delete) by walking both trees
//! - Persist the plan durably before touching the backup
//! - Execute the plan under a wall-clock deadline, recording a per-action
//!   outcome
//! - Resume an interrupted run later from the same persisted plan
//!
//! ## Architecture
//!
//! The system is split into two independent stages with persistence between
//! them:
//!
//! 1. **Plan**: [`DirectoryDiffer`] walks source and backup and produces a
//!    [`SyncPlan`], which a [`PlanStore`] persists.
//! 2. **Apply**: [`SyncExecutor`] reloads the plan and applies it in five
//!    fixed phases, consulting a [`DeadlineGuard`] before every phase and
//!    every action, then writes per-action outcomes back through the store.
//!
//! ## Modules
//!
//! - [`config`]: Configuration parsing and validation
//! - [`store`]: Plan storage backends
//! - [`planner`]: Diff computation, deadline gating, and plan execution
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! source_root: /data/projects
//! backup_root: /mnt/backup/projects
//!
//! sync:
//!   deadline_minutes: 60
//!   ignore_names:
//!     - "$RECYCLE.BIN"
//!     - "System Volume Information"
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod planner;
pub mod store;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigParser, ConfigValidator, MirrorConfig};
pub use error::{MirrorError, Result};
pub use planner::{
    ActionKind, DeadlineGuard, DirectoryDiffer, Outcome, PlanAction, SyncExecutor, SyncPlan,
    SyncReport, TargetKind,
};
pub use store::{LocalPlanStore, PlanStore};
