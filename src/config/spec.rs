//! Configuration types for the mirror engine.
//!
//! This module defines the structs that map to the `treemirror.yaml` file.
//! The configuration names the two roots, the sync behavior (deadline and
//! ignore set), and where plan documents are kept.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::planner::DEFAULT_IGNORE_NAMES;

/// The root configuration structure for a mirror run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MirrorConfig {
    /// Authoritative source tree.
    pub source_root: PathBuf,
    /// Backup tree being made content-equivalent to the source.
    pub backup_root: PathBuf,
    /// Sync behavior options.
    #[serde(default)]
    pub sync: SyncOptions,
    /// Plan store options.
    #[serde(default)]
    pub store: StoreOptions,
}

/// Sync behavior options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncOptions {
    /// Minutes from the start of execution after which no new phase or
    /// action may begin. Work already in flight is never interrupted.
    #[serde(default = "default_deadline_minutes")]
    pub deadline_minutes: u64,
    /// Directory leaf names excluded from both trees, at any depth.
    #[serde(default = "default_ignore_names")]
    pub ignore_names: Vec<String>,
}

/// Plan store options.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreOptions {
    /// Directory holding per-run plan documents. Defaults to
    /// `.treemirror` next to the configuration file (or the working
    /// directory when no file is used).
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            deadline_minutes: default_deadline_minutes(),
            ignore_names: default_ignore_names(),
        }
    }
}

impl MirrorConfig {
    /// Creates a configuration for the given roots with default options.
    #[must_use]
    pub fn new(source_root: impl Into<PathBuf>, backup_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            backup_root: backup_root.into(),
            sync: SyncOptions::default(),
            store: StoreOptions::default(),
        }
    }
}

/// Default execution deadline, in minutes.
const fn default_deadline_minutes() -> u64 {
    60
}

/// Default ignore set.
fn default_ignore_names() -> Vec<String> {
    DEFAULT_IGNORE_NAMES.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_yaml_gets_defaults() {
        let yaml = "source_root: /data\nbackup_root: /mnt/backup\n";
        let config: MirrorConfig = serde_yaml::from_str(yaml).expect("parse");

        assert_eq!(config.source_root, PathBuf::from("/data"));
        assert_eq!(config.sync.deadline_minutes, 60);
        assert!(config
            .sync
            .ignore_names
            .iter()
            .any(|n| n == "$RECYCLE.BIN"));
        assert!(config.store.path.is_none());
    }

    #[test]
    fn full_yaml_overrides_defaults() {
        let yaml = r"
source_root: /data
backup_root: /mnt/backup
sync:
  deadline_minutes: 3
  ignore_names:
    - node_modules
store:
  path: /var/lib/treemirror
";
        let config: MirrorConfig = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(config.sync.deadline_minutes, 3);
        assert_eq!(config.sync.ignore_names, vec!["node_modules".to_string()]);
        assert_eq!(config.store.path, Some(PathBuf::from("/var/lib/treemirror")));
    }
}
