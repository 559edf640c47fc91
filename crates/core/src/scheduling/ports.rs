//! Port interfaces for the external timer service

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use liftoff_domain::{JobKind, Result, Trigger};

/// Work executed when a scheduled job fires.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn run(&self) -> Result<()>;
}

/// A timer registration.
#[derive(Clone)]
pub struct ScheduledJob {
    /// Registration key; registering the same key again replaces the job.
    pub key: String,
    pub kind: JobKind,
    pub trigger: Trigger,
    pub handler: Arc<dyn JobHandler>,
}

impl ScheduledJob {
    pub fn recurring(
        key: impl Into<String>,
        kind: JobKind,
        interval: Duration,
        handler: Arc<dyn JobHandler>,
    ) -> Self {
        Self { key: key.into(), kind, trigger: Trigger::Every(interval), handler }
    }
}

impl std::fmt::Debug for ScheduledJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledJob")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("trigger", &self.trigger)
            .finish_non_exhaustive()
    }
}

/// External timer subsystem.
#[async_trait]
pub trait TimerService: Send + Sync {
    /// Register a job, replacing any pending job with the same key.
    async fn register(&self, job: ScheduledJob) -> Result<()>;

    /// Cancel the job with `key`. Returns whether a job was pending.
    async fn cancel(&self, key: &str) -> Result<bool>;

    /// Keys of all pending registrations.
    async fn pending(&self) -> Result<Vec<String>>;
}

/// A collaborator that recomputes and re-registers its own timers.
#[async_trait]
pub trait AlarmSchedule: Send + Sync {
    /// Short name used in error-report tags (`"<name>-startup"`).
    fn name(&self) -> &str;

    /// Recompute every pending timer; calling twice must not duplicate them.
    async fn schedule_all_alarms(&self) -> Result<()>;
}
