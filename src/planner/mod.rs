//! Planning module for mirror sync operations.
//!
//! This module computes the change plan between the source and backup
//! trees and executes persisted plans under a wall-clock deadline.

mod deadline;
mod differ;
mod executor;
mod plan;

pub use deadline::DeadlineGuard;
pub use differ::{DirectoryDiffer, DEFAULT_IGNORE_NAMES};
pub use executor::{SyncExecutor, SyncReport};
pub use plan::{ActionKind, Outcome, PlanAction, SyncPlan, TargetKind};
