//! Sync executor for applying persisted plans.
//!
//! The executor loads a plan from the store, applies it in five strictly
//! ordered phases, and writes per-action outcomes back. The deadline
//! guard is consulted before every phase and every action; filesystem
//! preconditions are re-checked immediately before each action because
//! plan computation and execution may be separated in time.

use std::path::Path;

use filetime::FileTime;
use serde::Serialize;
use tokio::fs;
use tracing::{error, info};

use crate::error::Result;
use crate::store::PlanStore;

use super::deadline::DeadlineGuard;
use super::plan::{ActionKind, Outcome, PlanAction, SyncPlan, TargetKind};

/// The five execution phases, in their fixed order.
const PHASES: &[(ActionKind, TargetKind, &str)] = &[
    (ActionKind::Delete, TargetKind::Directory, "delete directories"),
    (ActionKind::Create, TargetKind::Directory, "create directories"),
    (ActionKind::Delete, TargetKind::File, "delete files"),
    (ActionKind::Update, TargetKind::File, "update files"),
    (ActionKind::Copy, TargetKind::File, "copy files"),
];

/// Executor for persisted sync plans.
pub struct SyncExecutor<'a> {
    /// Store the plan is loaded from and outcomes are written back to.
    store: &'a dyn PlanStore,
}

/// Aggregate result of one execution attempt.
#[derive(Debug, Serialize)]
pub struct SyncReport {
    /// Total actions in the plan.
    pub total: usize,
    /// Actions whose recorded outcome is Success after this attempt.
    pub succeeded: usize,
    /// Actions whose recorded outcome is Failure after this attempt.
    pub failed: usize,
    /// Actions still Unknown after this attempt (skipped by a
    /// precondition, never reached, or blocked by the deadline).
    pub pending: usize,
    /// True if the deadline passed before every action was processed.
    pub deadline_reached: bool,
}

impl<'a> SyncExecutor<'a> {
    /// Creates an executor over the given store.
    #[must_use]
    pub const fn new(store: &'a dyn PlanStore) -> Self {
        Self { store }
    }

    /// Loads the plan, applies it, and persists per-action outcomes.
    ///
    /// Action-level I/O failures are recorded on the action and never
    /// abort the run; the returned report aggregates what happened.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself is unavailable.
    pub async fn execute(&self, guard: &DeadlineGuard) -> Result<SyncReport> {
        let mut plan = self.store.read_plan().await?;
        info!(
            "Executing plan with {} actions (cutoff: {})",
            plan.actions.len(),
            guard.cutoff()
        );

        let mut deadline_reached = false;

        for (kind, target, label) in PHASES {
            if !guard.may_begin() {
                deadline_reached = true;
                break;
            }
            deadline_reached |= Self::run_phase(&mut plan, *kind, *target, label, guard).await;
        }

        if deadline_reached {
            info!("Deadline passed; remaining actions left for a future run");
        }

        self.store.write_outcomes(&plan.actions).await?;

        Ok(Self::report(&plan, deadline_reached))
    }

    /// Runs one phase over its matching actions.
    ///
    /// Returns true if the deadline passed while the phase was running.
    async fn run_phase(
        plan: &mut SyncPlan,
        kind: ActionKind,
        target: TargetKind,
        label: &str,
        guard: &DeadlineGuard,
    ) -> bool {
        let indices: Vec<usize> = plan
            .actions
            .iter()
            .enumerate()
            .filter(|(_, a)| a.matches(kind, target))
            .map(|(i, _)| i)
            .collect();

        info!("Phase {label}: {} actions", indices.len());

        for index in indices {
            if !guard.may_begin() {
                return true;
            }
            Self::apply_action(&mut plan.actions[index]).await;
        }

        false
    }

    /// Applies a single action, recording its outcome.
    ///
    /// If the filesystem no longer matches the action's precondition the
    /// action is skipped silently and its outcome is left untouched.
    async fn apply_action(action: &mut PlanAction) {
        if !precondition_holds(action) {
            return;
        }

        info!("{}", action.description());

        let result = match (action.kind, action.target) {
            (ActionKind::Delete, TargetKind::Directory) => {
                remove_directory(action.directory_path.as_deref()).await
            }
            (ActionKind::Create, TargetKind::Directory) => {
                create_directory(action.directory_path.as_deref()).await
            }
            (ActionKind::Delete, TargetKind::File) => {
                remove_file(action.source_path.as_deref()).await
            }
            (ActionKind::Update, TargetKind::File) => {
                update_file(action.source_path.as_deref(), action.dest_path.as_deref()).await
            }
            (ActionKind::Copy, TargetKind::File) => {
                copy_file(action.source_path.as_deref(), action.dest_path.as_deref()).await
            }
            // Create(File) and Update(Directory) are never planned.
            _ => Err(std::io::Error::other("unsupported action")),
        };

        match result {
            Ok(()) => action.mark_success(),
            Err(e) => {
                error!("{} failed: {e}", action.description());
                action.mark_failure(e.to_string());
            }
        }
    }

    /// Builds the aggregate report for one attempt.
    fn report(plan: &SyncPlan, deadline_reached: bool) -> SyncReport {
        let succeeded = plan
            .actions
            .iter()
            .filter(|a| a.outcome == Outcome::Success)
            .count();
        SyncReport {
            total: plan.action_count(),
            succeeded,
            failed: plan.failure_count(),
            pending: plan.pending_count(),
            deadline_reached,
        }
    }
}

/// Checks the filesystem precondition for an action.
fn precondition_holds(action: &PlanAction) -> bool {
    let exists = |p: &Option<std::path::PathBuf>| p.as_deref().is_some_and(Path::exists);

    match (action.kind, action.target) {
        (ActionKind::Delete, TargetKind::Directory) => exists(&action.directory_path),
        (ActionKind::Create, TargetKind::Directory) => {
            action.directory_path.is_some() && !exists(&action.directory_path)
        }
        (ActionKind::Delete, TargetKind::File) => exists(&action.source_path),
        // Update refreshes an existing backup copy; both sides must still
        // be present.
        (ActionKind::Update, TargetKind::File) => {
            exists(&action.source_path) && exists(&action.dest_path)
        }
        (ActionKind::Copy, TargetKind::File) => {
            exists(&action.source_path) && action.dest_path.is_some() && !exists(&action.dest_path)
        }
        _ => false,
    }
}

/// Recursively removes a directory and all contents.
async fn remove_directory(path: Option<&Path>) -> std::io::Result<()> {
    let path = required(path)?;
    fs::remove_dir_all(path).await
}

/// Creates a directory. Parent-first plan ordering makes ancestors
/// implicit, but `create_dir_all` keeps resumed runs robust.
async fn create_directory(path: Option<&Path>) -> std::io::Result<()> {
    let path = required(path)?;
    fs::create_dir_all(path).await
}

/// Removes a single file.
async fn remove_file(path: Option<&Path>) -> std::io::Result<()> {
    let path = required(path)?;
    fs::remove_file(path).await
}

/// Replaces a stale backup copy: removes the destination, then copies the
/// source over with its timestamp.
async fn update_file(source: Option<&Path>, dest: Option<&Path>) -> std::io::Result<()> {
    let dest_path = required(dest)?;
    fs::remove_file(dest_path).await?;
    copy_file(source, dest).await
}

/// Copies full content from source to destination, then sets the
/// destination's last-modification timestamp to match the source's so
/// future diff runs see the pair as unchanged.
async fn copy_file(source: Option<&Path>, dest: Option<&Path>) -> std::io::Result<()> {
    let source = required(source)?;
    let dest = required(dest)?;

    fs::copy(source, dest).await?;

    let mtime = fs::metadata(source).await?.modified()?;
    filetime::set_file_mtime(dest, FileTime::from_system_time(mtime))
}

/// Treats a missing path field as an action-level failure.
fn required(path: Option<&Path>) -> std::io::Result<&Path> {
    path.ok_or_else(|| std::io::Error::other("action is missing a path"))
}

impl std::fmt::Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Applied {} of {} actions: {} succeeded, {} failed, {} pending",
            self.succeeded + self.failed,
            self.total,
            self.succeeded,
            self.failed,
            self.pending
        )?;
        if self.deadline_reached {
            write!(f, " (deadline reached)")?;
        }
        Ok(())
    }
}
