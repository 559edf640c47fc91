//! Registers startup jobs with the timer service.

use std::sync::Arc;
use std::time::Duration;

use liftoff_domain::{JobKind, Result};
use tracing::{debug, error, info};

use super::ports::{AlarmSchedule, JobHandler, ScheduledJob, TimerService};
use crate::observability_ports::ErrorReporter;

/// Front for the timer service and the two alarm schedules.
pub struct BackgroundScheduler {
    timer: Arc<dyn TimerService>,
    reminders: Arc<dyn AlarmSchedule>,
    alarms: Arc<dyn AlarmSchedule>,
    reporter: Arc<dyn ErrorReporter>,
}

impl BackgroundScheduler {
    pub fn new(
        timer: Arc<dyn TimerService>,
        reminders: Arc<dyn AlarmSchedule>,
        alarms: Arc<dyn AlarmSchedule>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self { timer, reminders, alarms, reporter }
    }

    /// Register (or replace) a recurring job under `key`.
    pub async fn schedule_recurring(
        &self,
        key: &str,
        kind: JobKind,
        interval: Duration,
        handler: Arc<dyn JobHandler>,
    ) -> Result<()> {
        self.timer.register(ScheduledJob::recurring(key, kind, interval, handler)).await?;
        debug!(key, %kind, interval_secs = interval.as_secs(), "scheduler.recurring.registered");
        Ok(())
    }

    /// Recompute reminders and alarms.
    ///
    /// The two schedules are independent: a failure in one is reported and
    /// the other still runs. Returns the number of schedules that failed.
    pub async fn schedule_all_alarms(&self) -> usize {
        let mut failed = 0;
        for schedule in [&self.reminders, &self.alarms] {
            match schedule.schedule_all_alarms().await {
                Ok(()) => info!(schedule = schedule.name(), "scheduler.alarms.recomputed"),
                Err(err) => {
                    error!(schedule = schedule.name(), error = %err, "scheduler.alarms.failed");
                    let tag = format!("{}-startup", schedule.name());
                    self.reporter.report_error(&tag, &err);
                    failed += 1;
                }
            }
        }
        failed
    }

    /// The underlying timer service.
    pub fn timer(&self) -> &Arc<dyn TimerService> {
        &self.timer
    }
}
