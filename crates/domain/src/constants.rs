//! Application constants
//!
//! Centralized location for preference keys, thresholds and default
//! intervals used throughout the startup sequence.

use std::time::Duration;

// Version bookkeeping
pub const PREF_CURRENT_VERSION: &str = "current_version";
/// Versions above this one always have a storage file on disk.
pub const STABLE_STORAGE_VERSION: u32 = 135;
/// Sentinel for "installed version unknown".
pub const UNKNOWN_VERSION: u32 = 0;

// Preference keys touched during startup
pub const PREF_SYNC_ONGOING: &str = "sync_ongoing";
pub const PREF_SYNC_INTERVAL: &str = "sync_interval_seconds";
pub const PREF_TASK_KILLER_NOTICE_DISMISSED: &str = "task_killer_notice_dismissed";
pub const PREF_DEFAULT_URGENCY: &str = "default_urgency";
pub const PREF_DEFAULT_IMPORTANCE: &str = "default_importance";
pub const PREF_DEFAULT_REMINDER_MINUTES: &str = "default_reminder_minutes";
pub const PREF_NIGHTLY_REMINDERS: &str = "nightly_reminders";

// Sync interval bounds enforced by normalization
pub const MIN_SYNC_INTERVAL_SECS: i64 = 300;
pub const MAX_SYNC_INTERVAL_SECS: i64 = 86_400;

// Scheduled job keys
pub const JOB_WIDGET_REFRESH: &str = "widget-refresh";
pub const JOB_REMOTE_SYNC: &str = "remote-sync";
pub const JOB_BACKUP_SNAPSHOT: &str = "backup-snapshot";

// Default intervals
pub const WIDGET_UPDATE_INTERVAL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 3_600;
pub const DEFAULT_BACKUP_INTERVAL_SECS: u64 = 24 * 3_600;
pub const DEFAULT_BACKUP_RETENTION: usize = 7;

// Advisory scan
/// Permission requested by utilities that kill other applications' processes.
pub const PERMISSION_RESTART_PACKAGES: &str = "restart-packages";
/// Packages shipped with the platform are never reported.
pub const SYSTEM_PACKAGE_PREFIX: &str = "com.android";

// Analytics
pub const EVENT_LOST_DATA_RESTORED: &str = "lost-data-restored";
