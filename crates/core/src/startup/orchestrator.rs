//! Startup orchestrator - runs once per process to make the application ready.
//!
//! The synchronous phase (everything except the background worker) runs on
//! the caller's task, one step after another. Every step that touches a
//! collaborator is isolated: its failure is logged, reported under a stable
//! tag and recorded in the [`StartupReport`], and the sequence continues.
//! The only hard ordering guarantee across steps is that the recorded
//! version is written strictly after a successful migration.
//!
//! # Example
//!
//! ```no_run
//! use liftoff_core::{StartupOrchestrator, StartupOutcome};
//! use liftoff_domain::Config;
//!
//! # async fn example(orchestrator: StartupOrchestrator) {
//! let config = Config::default();
//! match orchestrator.run(config.environment()).await {
//!     StartupOutcome::Completed(report) => {
//!         let _ = report.background.await;
//!     }
//!     StartupOutcome::AlreadyStarted => {}
//! }
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use liftoff_domain::constants::{
    JOB_BACKUP_SNAPSHOT, JOB_REMOTE_SYNC, JOB_WIDGET_REFRESH, PREF_SYNC_INTERVAL, PREF_SYNC_ONGOING,
    UNKNOWN_VERSION,
};
use liftoff_domain::{
    AppEnvironment, Config, JobKind, LiftoffError, PreferenceValue, RestoreOutcome, VersionRecord,
};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::advisory::TaskKillerAdvisor;
use super::fault::install_panic_reporter;
use super::guard::StartupGuard;
use super::ports::PackageMetadata;
use crate::observability_ports::ErrorReporter;
use crate::preferences::ports::{PreferenceStore, VersionStore};
use crate::recovery::RecoveryInspector;
use crate::scheduling::ports::JobHandler;
use crate::scheduling::BackgroundScheduler;
use crate::storage_ports::StorageEngine;
use crate::upgrade::UpgradeRunner;

/// Handlers for the jobs registered during startup.
#[derive(Clone)]
pub struct StartupJobs {
    pub widget_refresh: Arc<dyn JobHandler>,
    pub remote_sync: Arc<dyn JobHandler>,
    pub backup_snapshot: Arc<dyn JobHandler>,
}

/// Collaborators wired at composition time.
#[derive(Clone)]
pub struct StartupDeps {
    pub reporter: Arc<dyn ErrorReporter>,
    pub versions: Arc<dyn VersionStore>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub package_metadata: Arc<dyn PackageMetadata>,
    pub storage: Arc<dyn StorageEngine>,
    pub recovery: Arc<RecoveryInspector>,
    pub upgrade: Arc<UpgradeRunner>,
    pub scheduler: Arc<BackgroundScheduler>,
    pub advisor: Arc<TaskKillerAdvisor>,
    pub jobs: StartupJobs,
}

/// Intervals and defaults applied by the startup sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct StartupSettings {
    pub widget_refresh_interval: Duration,
    pub sync_enabled: bool,
    pub sync_interval: Duration,
    pub backup_enabled: bool,
    pub backup_interval: Duration,
    pub preference_defaults: BTreeMap<String, PreferenceValue>,
}

impl StartupSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            widget_refresh_interval: config.widget.refresh_interval(),
            sync_enabled: config.sync.enabled,
            sync_interval: config.sync.interval(),
            backup_enabled: config.backup.enabled,
            backup_interval: config.backup.snapshot_interval(),
            preference_defaults: config.preferences.defaults.clone(),
        }
    }
}

impl Default for StartupSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// What a completed startup did.
#[derive(Debug)]
pub struct StartupReport {
    pub versions: VersionRecord,
    /// Number of versioned migration steps applied.
    pub migrations_applied: usize,
    pub restore: RestoreOutcome,
    /// Error-report tags of the synchronous steps that failed.
    pub failed_steps: Vec<String>,
    /// The fire-and-forget background worker. `run` never awaits it.
    pub background: JoinHandle<()>,
}

impl StartupReport {
    pub fn is_clean(&self) -> bool {
        self.failed_steps.is_empty()
    }
}

/// Result of [`StartupOrchestrator::run`].
#[derive(Debug)]
pub enum StartupOutcome {
    Completed(StartupReport),
    /// A previous call already ran the startup body.
    AlreadyStarted,
}

/// Single entry point that brings the application to "ready".
pub struct StartupOrchestrator {
    deps: StartupDeps,
    settings: StartupSettings,
    guard: StartupGuard,
    environment: OnceLock<AppEnvironment>,
}

impl StartupOrchestrator {
    pub fn new(deps: StartupDeps, settings: StartupSettings) -> Self {
        Self { deps, settings, guard: StartupGuard::new(), environment: OnceLock::new() }
    }

    /// Whether the startup body has completed.
    pub fn has_started(&self) -> bool {
        self.guard.is_set()
    }

    /// Environment bound by the first run.
    pub fn environment(&self) -> Option<&AppEnvironment> {
        self.environment.get()
    }

    /// Run the startup sequence once.
    ///
    /// Concurrent callers are serialized; every call after the first
    /// returns [`StartupOutcome::AlreadyStarted`] without side effects.
    pub async fn run(&self, environment: AppEnvironment) -> StartupOutcome {
        let Some(pass) = self.guard.enter().await else {
            debug!("startup.already_started");
            return StartupOutcome::AlreadyStarted;
        };

        let mut failed = Vec::new();

        install_panic_reporter(Arc::clone(&self.deps.reporter));

        let environment = self.environment.get_or_init(|| environment);

        let versions = self.read_versions(environment, &mut failed).await;
        info!(
            last_recorded = versions.last_recorded,
            current_installed = versions.current_installed,
            "startup.begin"
        );

        let restore = self.deps.recovery.maybe_restore(environment, versions.last_recorded).await;

        let migrations_applied = self.migrate(versions, &mut failed).await;

        if !self.deps.upgrade.apply_secondary_normalization(environment).await.is_empty() {
            failed.push("startup-normalization".to_string());
        }

        let background = self.spawn_background_worker();

        self.apply_preference_defaults(&mut failed).await;
        self.clear_stale_sync_flag(&mut failed).await;
        self.schedule_services(&mut failed).await;

        if environment.restricted_build {
            debug!("startup.advisory.skipped_restricted_build");
        } else if let Err(err) = self.deps.advisor.check().await {
            self.report("startup-advisory", &err, &mut failed);
        }

        pass.complete();
        info!(failed_steps = failed.len(), ?restore, "startup.ready");

        StartupOutcome::Completed(StartupReport {
            versions,
            migrations_applied,
            restore,
            failed_steps: failed,
            background,
        })
    }

    async fn read_versions(
        &self,
        environment: &AppEnvironment,
        failed: &mut Vec<String>,
    ) -> VersionRecord {
        let last_recorded = match self.deps.versions.current_version().await {
            Ok(version) => version,
            Err(err) => {
                self.report("startup-version-read", &err, failed);
                UNKNOWN_VERSION
            }
        };

        let current_installed =
            match self.deps.package_metadata.version_code(&environment.package_id).await {
                Ok(version) => version,
                Err(err) => {
                    self.report("startup-package-read", &err, failed);
                    UNKNOWN_VERSION
                }
            };

        VersionRecord::new(last_recorded, current_installed)
    }

    async fn migrate(&self, versions: VersionRecord, failed: &mut Vec<String>) -> usize {
        if !versions.needs_migration() {
            return 0;
        }

        let applied = match self
            .deps
            .upgrade
            .apply_versioned_migration(versions.last_recorded, versions.current_installed)
            .await
        {
            Ok(applied) => applied,
            Err(err) => {
                // Recorded version stays put so the next startup retries.
                self.report("startup-migration", &err, failed);
                return 0;
            }
        };

        match self.deps.versions.set_current_version(versions.current_installed).await {
            Ok(()) => info!(
                from = versions.last_recorded,
                to = versions.current_installed,
                steps = applied,
                "startup.migration.applied"
            ),
            Err(err) => self.report("startup-version-write", &err, failed),
        }
        applied
    }

    fn spawn_background_worker(&self) -> JoinHandle<()> {
        let worker = BackgroundWorker {
            reporter: Arc::clone(&self.deps.reporter),
            storage: Arc::clone(&self.deps.storage),
            scheduler: Arc::clone(&self.deps.scheduler),
            widget_refresh: Arc::clone(&self.deps.jobs.widget_refresh),
            widget_refresh_interval: self.settings.widget_refresh_interval,
        };
        tokio::spawn(worker.run())
    }

    async fn apply_preference_defaults(&self, failed: &mut Vec<String>) {
        match self.deps.preferences.apply_defaults(&self.settings.preference_defaults).await {
            Ok(written) => debug!(written, "startup.preferences.defaults_applied"),
            Err(err) => self.report("startup-preference-defaults", &err, failed),
        }
    }

    async fn clear_stale_sync_flag(&self, failed: &mut Vec<String>) {
        let result = async {
            if self.deps.preferences.get_bool(PREF_SYNC_ONGOING, false).await? {
                warn!("startup.sync.stale_ongoing_flag");
                self.deps.preferences.set_bool(PREF_SYNC_ONGOING, false).await?;
            }
            Ok::<(), LiftoffError>(())
        }
        .await;

        if let Err(err) = result {
            self.report("startup-sync-flag", &err, failed);
        }
    }

    async fn schedule_services(&self, failed: &mut Vec<String>) {
        let scheduler = &self.deps.scheduler;

        if self.settings.sync_enabled {
            let interval = self.sync_interval(failed).await;
            if let Err(err) = scheduler
                .schedule_recurring(
                    JOB_REMOTE_SYNC,
                    JobKind::BackgroundSync,
                    interval,
                    Arc::clone(&self.deps.jobs.remote_sync),
                )
                .await
            {
                self.report("startup-schedule-sync", &err, failed);
            }
        }

        if self.settings.backup_enabled {
            if let Err(err) = scheduler
                .schedule_recurring(
                    JOB_BACKUP_SNAPSHOT,
                    JobKind::BackgroundSync,
                    self.settings.backup_interval,
                    Arc::clone(&self.deps.jobs.backup_snapshot),
                )
                .await
            {
                self.report("startup-schedule-backup", &err, failed);
            }
        }
    }

    /// Sync interval from preferences, falling back to the configured one
    /// when the preference is absent or unusable.
    async fn sync_interval(&self, failed: &mut Vec<String>) -> Duration {
        match self.deps.preferences.get_int(PREF_SYNC_INTERVAL).await {
            Ok(Some(secs)) => match u64::try_from(secs) {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(secs, "startup.sync.invalid_interval_preference");
                    self.settings.sync_interval
                }
            },
            Ok(None) => self.settings.sync_interval,
            Err(err) => {
                self.report("startup-sync-interval", &err, failed);
                self.settings.sync_interval
            }
        }
    }

    fn report(&self, tag: &str, err: &LiftoffError, failed: &mut Vec<String>) {
        warn!(tag, error = %err, "startup.step_failed");
        self.deps.reporter.report_error(tag, err);
        failed.push(tag.to_string());
    }
}

/// Collaborators owned by the background task, captured at spawn time.
struct BackgroundWorker {
    reporter: Arc<dyn ErrorReporter>,
    storage: Arc<dyn StorageEngine>,
    scheduler: Arc<BackgroundScheduler>,
    widget_refresh: Arc<dyn JobHandler>,
    widget_refresh_interval: Duration,
}

impl BackgroundWorker {
    async fn run(self) {
        if let Err(err) = self
            .scheduler
            .schedule_recurring(
                JOB_WIDGET_REFRESH,
                JobKind::RecurringAlarm,
                self.widget_refresh_interval,
                Arc::clone(&self.widget_refresh),
            )
            .await
        {
            self.report("startup-widget-alarm", &err);
        }

        match self.storage.open_for_writing().await {
            Ok(()) => {
                if let Err(err) = self.storage.cleanup().await {
                    self.report("startup-storage-cleanup", &err);
                }
            }
            Err(err) => self.report("startup-storage-open", &err),
        }

        // Runs even when storage could not be opened or cleaned.
        let failed_schedules = self.scheduler.schedule_all_alarms().await;

        info!(failed_schedules, "startup.background.completed");
    }

    fn report(&self, tag: &str, err: &LiftoffError) {
        error!(tag, error = %err, "startup.background.step_failed");
        self.reporter.report_error(tag, err);
    }
}
