//! Local file-based plan storage backend.
//!
//! Each run's plan is a single JSON document under a plans directory,
//! named from the store's creation time so historical and concurrent runs
//! never share a document.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{MirrorError, Result, StoreError};
use crate::planner::{PlanAction, SyncPlan};

use super::backend::PlanStore;

/// Prefix of per-run plan documents.
const PLAN_FILE_PREFIX: &str = "plan_";

/// Local file-based plan store.
#[derive(Debug)]
pub struct LocalPlanStore {
    /// Directory holding plan documents.
    base_dir: PathBuf,
    /// Path to this run's plan document.
    plan_path: PathBuf,
}

impl LocalPlanStore {
    /// Creates a store for a new run under the given plans directory.
    ///
    /// The plan document is named from the current local time, e.g.
    /// `plan_2026-08-07-14-30-05.json`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let file_name = format!(
            "{PLAN_FILE_PREFIX}{}.json",
            Local::now().format("%Y-%m-%d-%H-%M-%S")
        );
        let plan_path = base_dir.join(file_name);

        Self {
            base_dir,
            plan_path,
        }
    }

    /// Creates a store over an existing plan document.
    #[must_use]
    pub fn with_plan_path(plan_path: impl Into<PathBuf>) -> Self {
        let plan_path = plan_path.into();
        let base_dir = plan_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        Self {
            base_dir,
            plan_path,
        }
    }

    /// Opens the most recently created plan document under the given
    /// plans directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the directory holds no plan
    /// documents.
    pub async fn open_latest(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let mut newest: Option<PathBuf> = None;

        let mut entries = fs::read_dir(&base_dir).await.map_err(|_| {
            MirrorError::Store(StoreError::NotFound {
                path: base_dir.clone(),
            })
        })?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_plan = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(PLAN_FILE_PREFIX) && n.ends_with(".json"));
            // The timestamped naming scheme makes lexical order creation
            // order.
            if is_plan && newest.as_ref().is_none_or(|n| path > *n) {
                newest = Some(path);
            }
        }

        newest.map_or_else(
            || {
                Err(MirrorError::Store(StoreError::NotFound {
                    path: base_dir.clone(),
                }))
            },
            |path| Ok(Self::with_plan_path(path)),
        )
    }

    /// The path of this store's plan document.
    #[must_use]
    pub fn plan_path(&self) -> &Path {
        &self.plan_path
    }

    /// Ensures the plans directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if !self.base_dir.exists() {
            debug!("Creating plans directory: {}", self.base_dir.display());
            fs::create_dir_all(&self.base_dir).await.map_err(|e| {
                MirrorError::Store(StoreError::write_failed(format!(
                    "Failed to create plans directory: {e}"
                )))
            })?;
        }
        Ok(())
    }

    /// Serializes and atomically writes the plan document.
    async fn save_document(&self, plan: &SyncPlan) -> Result<()> {
        self.ensure_dir().await?;

        let content = serde_json::to_string_pretty(plan).map_err(|e| {
            MirrorError::Store(StoreError::serialization(format!(
                "Failed to serialize plan: {e}"
            )))
        })?;

        // Write to a temporary file first, then rename for atomicity
        let temp_path = self.plan_path.with_extension("tmp");

        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            MirrorError::Store(StoreError::write_failed(format!(
                "Failed to create plan file: {e}"
            )))
        })?;

        file.write_all(content.as_bytes()).await.map_err(|e| {
            MirrorError::Store(StoreError::write_failed(format!(
                "Failed to write plan file: {e}"
            )))
        })?;

        file.sync_all().await.map_err(|e| {
            MirrorError::Store(StoreError::write_failed(format!(
                "Failed to sync plan file: {e}"
            )))
        })?;

        drop(file);

        fs::rename(&temp_path, &self.plan_path).await.map_err(|e| {
            MirrorError::Store(StoreError::write_failed(format!(
                "Failed to move plan file into place: {e}"
            )))
        })?;

        Ok(())
    }

    /// Reads and parses the plan document.
    async fn load_document(&self) -> Result<SyncPlan> {
        if !self.plan_path.exists() {
            return Err(MirrorError::Store(StoreError::NotFound {
                path: self.plan_path.clone(),
            }));
        }

        let content = fs::read_to_string(&self.plan_path).await.map_err(|e| {
            MirrorError::Store(StoreError::corrupted(format!(
                "Failed to read plan file: {e}"
            )))
        })?;

        let plan: SyncPlan = serde_json::from_str(&content).map_err(|e| {
            MirrorError::Store(StoreError::corrupted(format!(
                "Failed to parse plan file: {e}"
            )))
        })?;

        Ok(plan)
    }
}

#[async_trait]
impl PlanStore for LocalPlanStore {
    async fn write_plan(&self, plan: &mut SyncPlan) -> Result<()> {
        for action in &mut plan.actions {
            if action.id.is_none() {
                action.id = Some(Uuid::new_v4());
            }
        }

        info!(
            "Persisting plan with {} actions to: {}",
            plan.actions.len(),
            self.plan_path.display()
        );
        self.save_document(plan).await
    }

    async fn read_plan(&self) -> Result<SyncPlan> {
        info!("Loading plan from: {}", self.plan_path.display());
        self.load_document().await
    }

    async fn write_outcomes(&self, actions: &[PlanAction]) -> Result<()> {
        let mut plan = self.load_document().await?;

        for updated in actions {
            let Some(id) = updated.id else { continue };
            if let Some(existing) = plan.actions.iter_mut().find(|a| a.id == Some(id)) {
                existing.outcome = updated.outcome;
                existing.message.clone_from(&updated.message);
            }
        }

        info!("Updating outcomes in: {}", self.plan_path.display());
        self.save_document(&plan).await
    }

    async fn exists(&self) -> Result<bool> {
        Ok(self.plan_path.exists())
    }

    fn backend_type(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::planner::{ActionKind, Outcome, TargetKind};

    use super::*;

    fn sample_plan() -> SyncPlan {
        let mut plan = SyncPlan::new("/src", "/bak");
        plan.actions.push(PlanAction::create_directory("/bak/a"));
        plan.actions
            .push(PlanAction::copy_file("/src/a/f", "/bak/a/f"));
        plan
    }

    #[tokio::test]
    async fn write_assigns_ids_and_read_roundtrips() {
        let temp = TempDir::new().expect("temp");
        let store = LocalPlanStore::new(temp.path());

        let mut plan = sample_plan();
        store.write_plan(&mut plan).await.expect("write");
        assert!(plan.actions.iter().all(|a| a.id.is_some()));

        let loaded = store.read_plan().await.expect("read");
        assert_eq!(loaded.action_count(), 2);
        assert_eq!(loaded.actions[0].id, plan.actions[0].id);
        assert!(loaded.actions[0].matches(ActionKind::Create, TargetKind::Directory));
    }

    #[tokio::test]
    async fn read_without_plan_is_an_error() {
        let temp = TempDir::new().expect("temp");
        let store = LocalPlanStore::new(temp.path());

        assert!(!store.exists().await.expect("exists"));
        assert!(store.read_plan().await.is_err());
    }

    #[tokio::test]
    async fn outcomes_are_updated_by_identity() {
        let temp = TempDir::new().expect("temp");
        let store = LocalPlanStore::new(temp.path());

        let mut plan = sample_plan();
        store.write_plan(&mut plan).await.expect("write");

        plan.actions[0].mark_success();
        plan.actions[1].mark_failure("disk full");
        store
            .write_outcomes(&plan.actions)
            .await
            .expect("outcomes");

        let loaded = store.read_plan().await.expect("read");
        assert_eq!(loaded.actions[0].outcome, Outcome::Success);
        assert_eq!(loaded.actions[1].outcome, Outcome::Failure);
        assert_eq!(loaded.actions[1].message, "disk full");
    }

    #[tokio::test]
    async fn open_latest_finds_newest_document() {
        let temp = TempDir::new().expect("temp");

        let older = LocalPlanStore::with_plan_path(
            temp.path().join("plan_2026-01-01-00-00-00.json"),
        );
        let mut old_plan = sample_plan();
        older.write_plan(&mut old_plan).await.expect("write old");

        let newer = LocalPlanStore::with_plan_path(
            temp.path().join("plan_2026-06-01-00-00-00.json"),
        );
        let mut new_plan = SyncPlan::new("/src", "/bak");
        new_plan.actions.push(PlanAction::delete_file("/bak/x"));
        newer.write_plan(&mut new_plan).await.expect("write new");

        let latest = LocalPlanStore::open_latest(temp.path()).await.expect("open");
        let loaded = latest.read_plan().await.expect("read");
        assert_eq!(loaded.action_count(), 1);
        assert!(loaded.actions[0].matches(ActionKind::Delete, TargetKind::File));
    }

    #[tokio::test]
    async fn open_latest_without_documents_is_an_error() {
        let temp = TempDir::new().expect("temp");
        assert!(LocalPlanStore::open_latest(temp.path()).await.is_err());
    }

    #[tokio::test]
    async fn distinct_stores_use_distinct_documents() {
        let temp = TempDir::new().expect("temp");
        let a = LocalPlanStore::with_plan_path(temp.path().join("plan_a.json"));
        let b = LocalPlanStore::with_plan_path(temp.path().join("plan_b.json"));

        let mut plan = sample_plan();
        a.write_plan(&mut plan).await.expect("write");

        assert!(a.exists().await.expect("exists"));
        assert!(!b.exists().await.expect("exists"));
    }
}
