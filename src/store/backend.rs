//! Plan store trait definition.
//!
//! This module defines the common interface for plan storage backends.

use async_trait::async_trait;

use crate::error::Result;
use crate::planner::{PlanAction, SyncPlan};

/// Trait for plan storage backends.
///
/// Each run uses its own distinct store instance, so concurrent or
/// historical runs never interfere. Actions are never deleted: the
/// persisted plan is the permanent record of what was attempted.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Persists the full action set, assigning an identity to each action
    /// that does not have one yet.
    async fn write_plan(&self, plan: &mut SyncPlan) -> Result<()>;

    /// Reads the full currently persisted plan.
    ///
    /// A missing or unreadable backing document is an error; store
    /// availability is an assumed precondition of the engine.
    async fn read_plan(&self) -> Result<SyncPlan>;

    /// Updates outcome and message for previously persisted actions,
    /// matched by identity. Actions without an identity are left alone.
    async fn write_outcomes(&self, actions: &[PlanAction]) -> Result<()>;

    /// Checks if a plan document exists.
    async fn exists(&self) -> Result<bool>;

    /// Gets the backend type name.
    fn backend_type(&self) -> &'static str;
}

#[async_trait]
impl PlanStore for Box<dyn PlanStore> {
    async fn write_plan(&self, plan: &mut SyncPlan) -> Result<()> {
        (**self).write_plan(plan).await
    }

    async fn read_plan(&self) -> Result<SyncPlan> {
        (**self).read_plan().await
    }

    async fn write_outcomes(&self, actions: &[PlanAction]) -> Result<()> {
        (**self).write_outcomes(actions).await
    }

    async fn exists(&self) -> Result<bool> {
        (**self).exists().await
    }

    fn backend_type(&self) -> &'static str {
        (**self).backend_type()
    }
}
