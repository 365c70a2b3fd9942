//! Sync plan types.
//!
//! This module defines the persisted plan structure: the ordered set of
//! actions required to make the backup tree content-equivalent to the
//! source tree, plus the per-action outcome recorded during execution.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A complete sync plan for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPlan {
    /// When the plan was computed.
    pub created_at: DateTime<Utc>,
    /// Source root the plan was computed against.
    pub source_root: PathBuf,
    /// Backup root the plan was computed against.
    pub backup_root: PathBuf,
    /// Planned actions in emission order (parent-before-child for creates).
    pub actions: Vec<PlanAction>,
}

/// A single planned unit of work against the backup tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanAction {
    /// Opaque identity, assigned by the store on first persistence.
    #[serde(default)]
    pub id: Option<Uuid>,
    /// What to do.
    pub kind: ActionKind,
    /// What the action operates on.
    pub target: TargetKind,
    /// Source-side path for File actions (the path being removed, for
    /// Delete).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
    /// Destination-side path for Copy/Update File actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_path: Option<PathBuf>,
    /// Path for Directory actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_path: Option<PathBuf>,
    /// Result of the most recent execution attempt.
    #[serde(default)]
    pub outcome: Outcome,
    /// Failure detail, empty unless the outcome is Failure.
    #[serde(default)]
    pub message: String,
}

/// Kinds of planned actions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Create a directory in the backup tree.
    Create,
    /// Copy a new file from source to backup.
    Copy,
    /// Refresh an existing backup file from source.
    Update,
    /// Remove a file or directory from the backup tree.
    Delete,
}

/// What an action operates on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
}

/// Tri-state result recorded against an action after an execution attempt.
///
/// An action skipped because its filesystem precondition no longer held
/// keeps its previous outcome (Unknown on a first attempt).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Not yet attempted, or skipped by a precondition check.
    #[default]
    Unknown,
    /// Applied successfully.
    Success,
    /// Application failed; see the action's message.
    Failure,
}

impl PlanAction {
    /// Creates a Create(Directory) action for a backup-side path.
    #[must_use]
    pub fn create_directory(path: impl Into<PathBuf>) -> Self {
        Self::directory(ActionKind::Create, path)
    }

    /// Creates a Delete(Directory) action for a backup-side path.
    ///
    /// Execution removes the directory and its entire subtree.
    #[must_use]
    pub fn delete_directory(path: impl Into<PathBuf>) -> Self {
        Self::directory(ActionKind::Delete, path)
    }

    /// Creates a Copy(File) action from a source path to a backup path.
    #[must_use]
    pub fn copy_file(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self::file(ActionKind::Copy, Some(source.into()), Some(dest.into()))
    }

    /// Creates an Update(File) action from a source path to a backup path.
    #[must_use]
    pub fn update_file(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self::file(ActionKind::Update, Some(source.into()), Some(dest.into()))
    }

    /// Creates a Delete(File) action for a backup-side path.
    #[must_use]
    pub fn delete_file(path: impl Into<PathBuf>) -> Self {
        Self::file(ActionKind::Delete, Some(path.into()), None)
    }

    fn directory(kind: ActionKind, path: impl Into<PathBuf>) -> Self {
        Self {
            id: None,
            kind,
            target: TargetKind::Directory,
            source_path: None,
            dest_path: None,
            directory_path: Some(path.into()),
            outcome: Outcome::Unknown,
            message: String::new(),
        }
    }

    fn file(kind: ActionKind, source: Option<PathBuf>, dest: Option<PathBuf>) -> Self {
        Self {
            id: None,
            kind,
            target: TargetKind::File,
            source_path: source,
            dest_path: dest,
            directory_path: None,
            outcome: Outcome::Unknown,
            message: String::new(),
        }
    }

    /// Records a successful execution attempt.
    pub fn mark_success(&mut self) {
        self.outcome = Outcome::Success;
        self.message.clear();
    }

    /// Records a failed execution attempt with a descriptive message.
    pub fn mark_failure(&mut self, message: impl Into<String>) {
        self.outcome = Outcome::Failure;
        self.message = message.into();
    }

    /// The path the action mutates on the backup side.
    ///
    /// For Copy/Update this is the destination; for Delete(File) the
    /// source path field carries the path being removed.
    #[must_use]
    pub fn affected_path(&self) -> Option<&Path> {
        match self.target {
            TargetKind::Directory => self.directory_path.as_deref(),
            TargetKind::File => match self.kind {
                ActionKind::Delete => self.source_path.as_deref(),
                _ => self.dest_path.as_deref(),
            },
        }
    }

    /// Returns a human-readable description of the action.
    #[must_use]
    pub fn description(&self) -> String {
        match (self.kind, self.target) {
            (ActionKind::Create, TargetKind::Directory) => {
                format!("Create directory '{}'", display_opt(&self.directory_path))
            }
            (ActionKind::Delete, TargetKind::Directory) => {
                format!("Delete directory '{}'", display_opt(&self.directory_path))
            }
            (ActionKind::Copy, _) => format!(
                "Copy '{}' -> '{}'",
                display_opt(&self.source_path),
                display_opt(&self.dest_path)
            ),
            (ActionKind::Update, _) => format!(
                "Update '{}' from '{}'",
                display_opt(&self.dest_path),
                display_opt(&self.source_path)
            ),
            (ActionKind::Delete, TargetKind::File) => {
                format!("Delete file '{}'", display_opt(&self.source_path))
            }
            (ActionKind::Create, TargetKind::File) => {
                format!("Create file '{}'", display_opt(&self.dest_path))
            }
        }
    }

    /// Returns true if this action matches the given kind and target.
    #[must_use]
    pub fn matches(&self, kind: ActionKind, target: TargetKind) -> bool {
        self.kind == kind && self.target == target
    }
}

fn display_opt(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map_or_else(String::new, |p| p.display().to_string())
}

impl SyncPlan {
    /// Creates a new plan for the given roots with no actions.
    #[must_use]
    pub fn new(source_root: impl Into<PathBuf>, backup_root: impl Into<PathBuf>) -> Self {
        Self {
            created_at: Utc::now(),
            source_root: source_root.into(),
            backup_root: backup_root.into(),
            actions: Vec::new(),
        }
    }

    /// Returns true if the plan has no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns the number of actions.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Counts actions matching a kind and target.
    #[must_use]
    pub fn count(&self, kind: ActionKind, target: TargetKind) -> usize {
        self.actions.iter().filter(|a| a.matches(kind, target)).count()
    }

    /// Counts actions whose outcome is still Unknown.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| a.outcome == Outcome::Unknown)
            .count()
    }

    /// Counts actions that ended in Failure.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| a.outcome == Outcome::Failure)
            .count()
    }

    /// Returns true if any action ended in Failure.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Copy => "copy",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::File => "file",
            Self::Directory => "directory",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Success => "success",
            Self::Failure => "failure",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for PlanAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} - {}", self.kind, self.target, self.description())
    }
}

impl std::fmt::Display for SyncPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.actions.is_empty() {
            return write!(f, "No changes required");
        }

        writeln!(f, "Sync plan ({} actions):", self.actions.len())?;
        writeln!(
            f,
            "  {} directories to delete, {} to create",
            self.count(ActionKind::Delete, TargetKind::Directory),
            self.count(ActionKind::Create, TargetKind::Directory),
        )?;
        write!(
            f,
            "  {} files to delete, {} to update, {} to copy",
            self.count(ActionKind::Delete, TargetKind::File),
            self.count(ActionKind::Update, TargetKind::File),
            self.count(ActionKind::Copy, TargetKind::File),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_populate_only_relevant_paths() {
        let create = PlanAction::create_directory("/b/a");
        assert!(create.source_path.is_none());
        assert!(create.dest_path.is_none());
        assert_eq!(create.directory_path.as_deref(), Some(Path::new("/b/a")));

        let copy = PlanAction::copy_file("/s/f", "/b/f");
        assert_eq!(copy.source_path.as_deref(), Some(Path::new("/s/f")));
        assert_eq!(copy.dest_path.as_deref(), Some(Path::new("/b/f")));
        assert!(copy.directory_path.is_none());

        let del = PlanAction::delete_file("/b/f");
        assert_eq!(del.source_path.as_deref(), Some(Path::new("/b/f")));
        assert!(del.dest_path.is_none());
    }

    #[test]
    fn new_actions_start_unknown() {
        let action = PlanAction::copy_file("/s/f", "/b/f");
        assert_eq!(action.outcome, Outcome::Unknown);
        assert!(action.message.is_empty());
    }

    #[test]
    fn mark_failure_records_message() {
        let mut action = PlanAction::delete_file("/b/f");
        action.mark_failure("permission denied");
        assert_eq!(action.outcome, Outcome::Failure);
        assert_eq!(action.message, "permission denied");
    }

    #[test]
    fn plan_counts_by_kind_and_target() {
        let mut plan = SyncPlan::new("/s", "/b");
        plan.actions.push(PlanAction::create_directory("/b/a"));
        plan.actions.push(PlanAction::copy_file("/s/a/f", "/b/a/f"));
        plan.actions.push(PlanAction::delete_directory("/b/old"));

        assert_eq!(plan.action_count(), 3);
        assert_eq!(plan.count(ActionKind::Create, TargetKind::Directory), 1);
        assert_eq!(plan.count(ActionKind::Copy, TargetKind::File), 1);
        assert_eq!(plan.count(ActionKind::Delete, TargetKind::Directory), 1);
        assert_eq!(plan.count(ActionKind::Delete, TargetKind::File), 0);
        assert_eq!(plan.pending_count(), 3);
        assert!(!plan.has_failures());
    }

    #[test]
    fn plan_roundtrips_through_json() {
        let mut plan = SyncPlan::new("/s", "/b");
        plan.actions.push(PlanAction::update_file("/s/f", "/b/f"));
        plan.actions[0].id = Some(Uuid::new_v4());
        plan.actions[0].mark_success();

        let json = serde_json::to_string(&plan).expect("serialize");
        let back: SyncPlan = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.actions.len(), 1);
        assert_eq!(back.actions[0].id, plan.actions[0].id);
        assert_eq!(back.actions[0].outcome, Outcome::Success);
    }
}
