//! Scheduling infrastructure
//!
//! - `CronTimerService`: keyed timer registrations on `tokio-cron-scheduler`
//!   with an explicit start/shutdown lifecycle
//! - `PersistedAlarmSchedule`: mirrors pending alarm rows into timers

pub mod alarm_schedule;
pub mod error;
pub mod timer_service;

pub use alarm_schedule::PersistedAlarmSchedule;
pub use error::{SchedulerError, SchedulerResult};
pub use timer_service::{CronTimerService, TimerServiceConfig};
