//! Scheduled job descriptors

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_enum_conversions;

/// Category of a timer registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    RecurringAlarm,
    OneShotReminder,
    BackgroundSync,
}

impl_domain_enum_conversions!(JobKind {
    RecurringAlarm => "recurring_alarm",
    OneShotReminder => "one_shot_reminder",
    BackgroundSync => "background_sync",
});

/// When a scheduled job fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Repeats with a fixed period.
    Every(Duration),
    /// Fires once at the given instant (immediately if already past).
    At(DateTime<Utc>),
}

impl Trigger {
    /// Delay from `now` until the first firing.
    pub fn initial_delay(&self, now: DateTime<Utc>) -> Duration {
        match self {
            Self::Every(period) => *period,
            Self::At(instant) => (*instant - now).to_std().unwrap_or(Duration::ZERO),
        }
    }
}
