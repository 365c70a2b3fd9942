//! Wall-clock deadline gate for sync execution.
//!
//! The guard holds a fixed cutoff instant and answers one question: may a
//! new unit of work begin now. It never interrupts work already in
//! progress; the executor consults it before each phase and each action.

use chrono::{DateTime, Duration, Utc};

/// A cooperative wall-clock gate.
#[derive(Debug, Clone, Copy)]
pub struct DeadlineGuard {
    /// Instant after which no new phase or action may begin.
    cutoff: DateTime<Utc>,
}

impl DeadlineGuard {
    /// Creates a guard with an absolute cutoff.
    #[must_use]
    pub const fn new(cutoff: DateTime<Utc>) -> Self {
        Self { cutoff }
    }

    /// Creates a guard whose cutoff is the given number of minutes from
    /// now.
    #[must_use]
    pub fn after_minutes(minutes: i64) -> Self {
        Self {
            cutoff: Utc::now() + Duration::minutes(minutes),
        }
    }

    /// Returns true while the current time is strictly before the cutoff.
    #[must_use]
    pub fn may_begin(&self) -> bool {
        Utc::now() < self.cutoff
    }

    /// The configured cutoff instant.
    #[must_use]
    pub const fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }
}
