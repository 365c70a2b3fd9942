//! Directory differ for computing sync plans.
//!
//! This module walks the source and backup trees and produces the minimal
//! ordered action set that makes the backup content-equivalent to the
//! source, with the source authoritative.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::error::{MirrorError, PlanError, Result};

use super::plan::{PlanAction, SyncPlan};

/// Directory names ignored by default in both trees.
///
/// These are filesystem-owned directories that should never be mirrored
/// or pruned.
pub const DEFAULT_IGNORE_NAMES: &[&str] =
    &["found.000", "$RECYCLE.BIN", "System Volume Information"];

/// Engine for computing the difference between a source and a backup tree.
///
/// Two independent depth-first pre-order traversals are performed:
///
/// 1. **Forward** over the source: missing backup directories become
///    Create actions, missing backup files become Copy actions, and files
///    whose last-modification timestamps differ become Update actions.
/// 2. **Reverse** over the backup: directories and files with no source
///    counterpart become Delete actions. A directory marked for deletion
///    covers its whole subtree, so the traversal does not descend into it.
///
/// Equality is decided purely by last-modification timestamp; content is
/// never read.
#[derive(Debug)]
pub struct DirectoryDiffer {
    /// Directory leaf names excluded from both traversals.
    ignore_names: HashSet<String>,
}

impl Default for DirectoryDiffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryDiffer {
    /// Creates a differ with the default ignore set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ignore_names: DEFAULT_IGNORE_NAMES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Replaces the ignore set with the given directory names.
    #[must_use]
    pub fn with_ignore_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Computes the sync plan for the given roots.
    ///
    /// Actions are emitted in traversal order, so a directory's Create
    /// always precedes the Copy/Update actions of its descendants.
    ///
    /// # Errors
    ///
    /// Returns an error if either root is not an existing directory or if
    /// the filesystem cannot be enumerated.
    pub fn compute_plan(&self, source_root: &Path, backup_root: &Path) -> Result<SyncPlan> {
        if !source_root.is_dir() {
            return Err(MirrorError::Plan(PlanError::SourceRootMissing {
                path: source_root.to_path_buf(),
            }));
        }
        if !backup_root.is_dir() {
            return Err(MirrorError::Plan(PlanError::BackupRootMissing {
                path: backup_root.to_path_buf(),
            }));
        }

        let mut plan = SyncPlan::new(source_root, backup_root);

        self.walk_source(source_root, source_root, backup_root, &mut plan.actions)?;
        self.walk_backup(backup_root, source_root, backup_root, &mut plan.actions)?;

        debug!(
            "Computed plan with {} actions for {} -> {}",
            plan.actions.len(),
            source_root.display(),
            backup_root.display()
        );
        Ok(plan)
    }

    /// Forward traversal: emits Create/Copy/Update actions for `dir`.
    fn walk_source(
        &self,
        dir: &Path,
        source_root: &Path,
        backup_root: &Path,
        actions: &mut Vec<PlanAction>,
    ) -> Result<()> {
        if self.is_ignored(dir) {
            debug!("Ignoring source directory: {}", dir.display());
            return Ok(());
        }

        if dir != source_root {
            let mapped = map_path(dir, source_root, backup_root)?;
            if !mapped.exists() {
                actions.push(PlanAction::create_directory(mapped));
            }
        }

        let (files, subdirs) = read_dir_sorted(dir)?;

        for file in files {
            let mapped = map_path(&file, source_root, backup_root)?;
            if mapped.exists() {
                if modified_time(&file)? != modified_time(&mapped)? {
                    actions.push(PlanAction::update_file(file, mapped));
                }
            } else {
                actions.push(PlanAction::copy_file(file, mapped));
            }
        }

        for subdir in subdirs {
            self.walk_source(&subdir, source_root, backup_root, actions)?;
        }

        Ok(())
    }

    /// Reverse traversal: emits Delete actions for backup-only paths.
    ///
    /// A directory with no source counterpart is deleted as a whole; its
    /// subtree is not visited, so no child-level actions are emitted for
    /// it.
    fn walk_backup(
        &self,
        dir: &Path,
        source_root: &Path,
        backup_root: &Path,
        actions: &mut Vec<PlanAction>,
    ) -> Result<()> {
        if self.is_ignored(dir) {
            debug!("Ignoring backup directory: {}", dir.display());
            return Ok(());
        }

        if dir != backup_root {
            let mapped = map_path(dir, backup_root, source_root)?;
            if !mapped.exists() {
                actions.push(PlanAction::delete_directory(dir));
                return Ok(());
            }
        }

        let (files, subdirs) = read_dir_sorted(dir)?;

        for file in files {
            let mapped = map_path(&file, backup_root, source_root)?;
            if !mapped.exists() {
                actions.push(PlanAction::delete_file(file));
            }
        }

        for subdir in subdirs {
            self.walk_backup(&subdir, source_root, backup_root, actions)?;
        }

        Ok(())
    }

    /// Returns true if the directory's leaf name is in the ignore set.
    fn is_ignored(&self, dir: &Path) -> bool {
        dir.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.ignore_names.contains(name))
    }
}

/// Maps a path nested under `from_root` onto `to_root`.
///
/// The mapping is structural: the root prefix is stripped and the
/// remainder rejoined onto the other root, so a root string recurring
/// elsewhere in the path cannot corrupt the result.
fn map_path(path: &Path, from_root: &Path, to_root: &Path) -> Result<PathBuf> {
    let relative = path
        .strip_prefix(from_root)
        .map_err(|_| {
            MirrorError::Plan(PlanError::PathOutsideRoot {
                path: path.to_path_buf(),
                root: from_root.to_path_buf(),
            })
        })?;
    Ok(to_root.join(relative))
}

/// Enumerates a directory into files and subdirectories, sorted by name.
///
/// Sorting keeps plans deterministic across platforms whose directory
/// enumeration order differs.
fn read_dir_sorted(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            subdirs.push(entry.path());
        } else if file_type.is_file() {
            files.push(entry.path());
        }
        // Symlinks and special files are left alone.
    }

    files.sort();
    subdirs.sort();
    Ok((files, subdirs))
}

/// Reads a path's last-modification timestamp.
fn modified_time(path: &Path) -> Result<SystemTime> {
    Ok(fs::metadata(path)?.modified()?)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use filetime::FileTime;
    use tempfile::TempDir;

    use crate::planner::plan::{ActionKind, TargetKind};

    use super::*;

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, content).expect("write");
    }

    fn set_mtime(path: &Path, unix_secs: i64) {
        filetime::set_file_mtime(path, FileTime::from_unix_time(unix_secs, 0)).expect("mtime");
    }

    fn roots() -> (TempDir, TempDir) {
        let source = TempDir::new().expect("source");
        let backup = TempDir::new().expect("backup");
        (source, backup)
    }

    #[test]
    fn empty_trees_produce_empty_plan() {
        let (source, backup) = roots();
        let plan = DirectoryDiffer::new()
            .compute_plan(source.path(), backup.path())
            .expect("plan");
        assert!(plan.is_empty());
    }

    #[test]
    fn missing_source_root_is_an_error() {
        let backup = TempDir::new().expect("backup");
        let result =
            DirectoryDiffer::new().compute_plan(Path::new("/nonexistent-root"), backup.path());
        assert!(result.is_err());
    }

    // Scenario: source has a/file.txt, backup is empty. The plan must be
    // [Create(dir a), Copy(file.txt)] in that order.
    #[test]
    fn new_directory_and_file_yield_create_then_copy() {
        let (source, backup) = roots();
        write_file(&source.path().join("a/file.txt"), "hello");

        let plan = DirectoryDiffer::new()
            .compute_plan(source.path(), backup.path())
            .expect("plan");

        assert_eq!(plan.action_count(), 2);
        assert!(plan.actions[0].matches(ActionKind::Create, TargetKind::Directory));
        assert_eq!(
            plan.actions[0].directory_path.as_deref(),
            Some(backup.path().join("a").as_path())
        );
        assert!(plan.actions[1].matches(ActionKind::Copy, TargetKind::File));
        assert_eq!(
            plan.actions[1].dest_path.as_deref(),
            Some(backup.path().join("a/file.txt").as_path())
        );
    }

    // Scenario: both trees have a/file.txt but mtimes differ. The plan is a
    // single Update action. (This exercises the corrected Update behavior's
    // planning side; execution is covered in the executor tests.)
    #[test]
    fn differing_mtime_yields_update_only() {
        let (source, backup) = roots();
        let src_file = source.path().join("a/file.txt");
        let bak_file = backup.path().join("a/file.txt");
        write_file(&src_file, "new");
        write_file(&bak_file, "old");
        set_mtime(&src_file, 1_700_000_100);
        set_mtime(&bak_file, 1_700_000_000);

        let plan = DirectoryDiffer::new()
            .compute_plan(source.path(), backup.path())
            .expect("plan");

        assert_eq!(plan.action_count(), 1);
        assert!(plan.actions[0].matches(ActionKind::Update, TargetKind::File));
        assert_eq!(plan.actions[0].source_path.as_deref(), Some(src_file.as_path()));
        assert_eq!(plan.actions[0].dest_path.as_deref(), Some(bak_file.as_path()));
    }

    #[test]
    fn equal_mtime_yields_no_action() {
        let (source, backup) = roots();
        let src_file = source.path().join("a/file.txt");
        let bak_file = backup.path().join("a/file.txt");
        write_file(&src_file, "same");
        write_file(&bak_file, "same but different content is fine");
        set_mtime(&src_file, 1_700_000_000);
        set_mtime(&bak_file, 1_700_000_000);

        let plan = DirectoryDiffer::new()
            .compute_plan(source.path(), backup.path())
            .expect("plan");
        assert!(plan.is_empty());
    }

    // Scenario: backup has b/old.txt, source lacks b entirely. The plan is a
    // single directory delete with no separate file delete beneath it.
    #[test]
    fn backup_only_directory_yields_single_delete() {
        let (source, backup) = roots();
        write_file(&backup.path().join("b/old.txt"), "stale");

        let plan = DirectoryDiffer::new()
            .compute_plan(source.path(), backup.path())
            .expect("plan");

        assert_eq!(plan.action_count(), 1);
        assert!(plan.actions[0].matches(ActionKind::Delete, TargetKind::Directory));
        assert_eq!(
            plan.actions[0].directory_path.as_deref(),
            Some(backup.path().join("b").as_path())
        );
    }

    #[test]
    fn backup_only_file_in_shared_directory_yields_file_delete() {
        let (source, backup) = roots();
        write_file(&source.path().join("shared/keep.txt"), "k");
        let bak_keep = backup.path().join("shared/keep.txt");
        write_file(&bak_keep, "k");
        set_mtime(&source.path().join("shared/keep.txt"), 1_700_000_000);
        set_mtime(&bak_keep, 1_700_000_000);
        write_file(&backup.path().join("shared/extra.txt"), "x");

        let plan = DirectoryDiffer::new()
            .compute_plan(source.path(), backup.path())
            .expect("plan");

        assert_eq!(plan.action_count(), 1);
        assert!(plan.actions[0].matches(ActionKind::Delete, TargetKind::File));
        assert_eq!(
            plan.actions[0].source_path.as_deref(),
            Some(backup.path().join("shared/extra.txt").as_path())
        );
    }

    // An ignored directory name produces no actions for itself or anything
    // beneath it, at any nesting depth, in either traversal.
    #[test]
    fn ignored_directory_is_skipped_at_depth() {
        let (source, backup) = roots();
        write_file(
            &source.path().join("a/b/$RECYCLE.BIN/junk/file.txt"),
            "junk",
        );
        write_file(&backup.path().join("c/$RECYCLE.BIN/other.txt"), "junk");

        let plan = DirectoryDiffer::new()
            .compute_plan(source.path(), backup.path())
            .expect("plan");

        for action in &plan.actions {
            let path = action.affected_path().expect("path");
            assert!(
                !path.components().any(|c| c.as_os_str() == "$RECYCLE.BIN"),
                "action touches ignored subtree: {action}"
            );
        }
        // a and a/b still get created; c gets deleted as backup-only... but
        // c contains only an ignored child, so c maps to a missing source
        // dir and is deleted wholesale.
        assert_eq!(plan.count(ActionKind::Create, TargetKind::Directory), 2);
        assert_eq!(plan.count(ActionKind::Copy, TargetKind::File), 0);
    }

    #[test]
    fn custom_ignore_set_replaces_default() {
        let (source, backup) = roots();
        write_file(&source.path().join("node_modules/pkg/index.js"), "x");

        let plan = DirectoryDiffer::new()
            .with_ignore_names(["node_modules"])
            .compute_plan(source.path(), backup.path())
            .expect("plan");
        assert!(plan.is_empty());
    }

    // Re-running the differ on two trees with no mutation in between yields
    // no forward actions.
    #[test]
    fn identical_trees_are_idempotent() {
        let (source, backup) = roots();
        for root in [source.path(), backup.path()] {
            let f = root.join("a/b/file.txt");
            write_file(&f, "same");
            set_mtime(&f, 1_700_000_000);
        }

        let plan = DirectoryDiffer::new()
            .compute_plan(source.path(), backup.path())
            .expect("plan");
        assert!(plan.is_empty());
    }

    // A directory whose name contains the source root's name as a substring
    // must still map structurally.
    #[test]
    fn path_mapping_is_structural_not_substring() {
        let from_root = Path::new("/data/src");
        let to_root = Path::new("/backup");
        let mapped = map_path(Path::new("/data/src/nested/src/file"), from_root, to_root)
            .expect("map");
        assert_eq!(mapped, Path::new("/backup/nested/src/file"));

        let outside = map_path(Path::new("/elsewhere/src/file"), from_root, to_root);
        assert!(outside.is_err());
    }

    #[test]
    fn plan_orders_parent_creates_before_children() {
        let (source, backup) = roots();
        write_file(&source.path().join("a/b/c/file.txt"), "x");

        let plan = DirectoryDiffer::new()
            .compute_plan(source.path(), backup.path())
            .expect("plan");

        let dirs: Vec<_> = plan
            .actions
            .iter()
            .filter(|a| a.matches(ActionKind::Create, TargetKind::Directory))
            .filter_map(|a| a.directory_path.clone())
            .collect();
        assert_eq!(
            dirs,
            vec![
                backup.path().join("a"),
                backup.path().join("a/b"),
                backup.path().join("a/b/c"),
            ]
        );
    }
}
