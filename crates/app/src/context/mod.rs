//! Application context - dependency injection container

use std::path::Path;
use std::sync::Arc;

use liftoff_core::{
    AlarmSchedule, AnalyticsPort, ApplicationCatalog, BackgroundScheduler, BackupCatalog,
    BackupImporter, ErrorReporter, PackageMetadata, PreferenceStore, RecoveryInspector,
    StartupDeps, StartupJobs, StartupOrchestrator, StartupOutcome, StartupSettings,
    StorageEngine, TaskKillerAdvisor, TimerService, UpgradeRunner, VersionStore,
};
use liftoff_domain::{Config, Result};
use liftoff_infra::{
    builtin_migrations, BackupSnapshotJob, ClampSyncInterval, CronTimerService, DbManager,
    DirectoryBackupCatalog, EnsureBackupDirectory, InstanceLock, JsonPreferenceStore,
    ManifestPackageMetadata, PersistedAlarmSchedule, ProcessCatalog, SqliteBackupImporter,
    SqliteStorage, TracingAnalytics, TracingErrorReporter,
};

use crate::jobs::{LoggingPrompt, RemoteSyncJob, WidgetRefreshJob};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub preferences: Arc<JsonPreferenceStore>,
    pub timers: Arc<CronTimerService>,
    pub reporter: Arc<TracingErrorReporter>,
    pub analytics: Arc<TracingAnalytics>,
    pub orchestrator: Arc<StartupOrchestrator>,

    // Keep instance lock alive for the lifetime of the app
    _instance_lock: InstanceLock,
}

impl AppContext {
    /// Create a new application context, locking the data directory.
    pub async fn new(config: Config) -> Result<Self> {
        let lock_dir = config.storage.data_dir.clone();
        Self::new_with_lock_dir(config, lock_dir).await
    }

    /// Create a new application context with a custom lock directory
    ///
    /// Tests can use this to provide per-test directories and avoid PID file
    /// conflicts.
    pub async fn new_with_lock_dir<P>(config: Config, lock_dir: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let instance_lock = InstanceLock::acquire(lock_dir)?;

        // Opened lazily: a restore may have to replace the file first
        let db = Arc::new(DbManager::new(config.database_path(), config.storage.pool_size));
        let preferences = Arc::new(JsonPreferenceStore::open(&config.preferences.path)?);

        let timers = Arc::new(CronTimerService::new().await?);
        timers.start().await?;

        let reporter = Arc::new(TracingErrorReporter::new());
        let analytics = Arc::new(TracingAnalytics::new());

        let deps = wire(&config, &db, &preferences, &timers, &reporter, &analytics)?;
        let orchestrator =
            Arc::new(StartupOrchestrator::new(deps, StartupSettings::from_config(&config)));

        tracing::info!(
            data_dir = %config.storage.data_dir.display(),
            package_id = %config.startup.package_id,
            "app_context.created"
        );

        Ok(Self {
            config,
            db,
            preferences,
            timers,
            reporter,
            analytics,
            orchestrator,
            _instance_lock: instance_lock,
        })
    }

    /// Run the startup sequence against the configured environment.
    ///
    /// Only the first call does any work; later calls return
    /// [`StartupOutcome::AlreadyStarted`].
    pub async fn start(&self) -> StartupOutcome {
        let outcome = self.orchestrator.run(self.config.environment()).await;
        match &outcome {
            StartupOutcome::Completed(report) => tracing::info!(
                last_recorded = report.versions.last_recorded,
                installed = report.versions.current_installed,
                migrations = report.migrations_applied,
                restore = ?report.restore,
                failed_steps = ?report.failed_steps,
                "app_context.started"
            ),
            StartupOutcome::AlreadyStarted => tracing::debug!("app_context.already_started"),
        }
        outcome
    }

    /// Stop the timer service and release pooled connections.
    pub async fn shutdown(&self) -> Result<()> {
        self.timers.shutdown().await?;
        self.db.close();
        tracing::info!(
            errors_reported = self.reporter.reported(),
            events = ?self.analytics.snapshot(),
            "app_context.shutdown"
        );
        Ok(())
    }
}

fn wire(
    config: &Config,
    db: &Arc<DbManager>,
    preferences: &Arc<JsonPreferenceStore>,
    timers: &Arc<CronTimerService>,
    reporter: &Arc<TracingErrorReporter>,
    analytics: &Arc<TracingAnalytics>,
) -> Result<StartupDeps> {
    let reporter: Arc<dyn ErrorReporter> = reporter.clone();
    let analytics: Arc<dyn AnalyticsPort> = analytics.clone();
    let versions: Arc<dyn VersionStore> = preferences.clone();
    let prefs: Arc<dyn PreferenceStore> = preferences.clone();
    let timer: Arc<dyn TimerService> = timers.clone();

    let storage: Arc<dyn StorageEngine> =
        Arc::new(SqliteStorage::new(config.storage.database_name.clone(), Arc::clone(db)));
    let catalog: Arc<dyn BackupCatalog> = Arc::new(DirectoryBackupCatalog);
    let importer: Arc<dyn BackupImporter> = Arc::new(SqliteBackupImporter::new(Arc::clone(db)));
    let recovery = Arc::new(RecoveryInspector::new(
        Arc::clone(&storage),
        catalog,
        importer,
        analytics,
        config.startup.stable_storage_version,
    ));

    let mut upgrade = UpgradeRunner::new(Arc::clone(&reporter));
    for (threshold, migration) in builtin_migrations(db) {
        upgrade = upgrade.with_step(threshold, migration);
    }
    let upgrade = Arc::new(
        upgrade
            .with_normalization(Arc::new(EnsureBackupDirectory))
            .with_normalization(Arc::new(ClampSyncInterval::new(Arc::clone(&prefs)))),
    );

    let reminders: Arc<dyn AlarmSchedule> =
        Arc::new(PersistedAlarmSchedule::reminders(Arc::clone(db), Arc::clone(&timer))?);
    let alarms: Arc<dyn AlarmSchedule> =
        Arc::new(PersistedAlarmSchedule::alarms(Arc::clone(db), Arc::clone(&timer))?);
    let scheduler =
        Arc::new(BackgroundScheduler::new(timer, reminders, alarms, Arc::clone(&reporter)));

    let apps: Arc<dyn ApplicationCatalog> =
        Arc::new(ProcessCatalog::new(&config.advisory.task_killer_names));
    let advisor =
        Arc::new(TaskKillerAdvisor::new(apps, Arc::new(LoggingPrompt), Arc::clone(&prefs)));

    let package_metadata: Arc<dyn PackageMetadata> =
        Arc::new(ManifestPackageMetadata::new(config.startup.manifest_path.clone()));

    let jobs = StartupJobs {
        widget_refresh: Arc::new(WidgetRefreshJob::new(Arc::clone(db))),
        remote_sync: Arc::new(RemoteSyncJob::new(Arc::clone(&prefs))),
        backup_snapshot: Arc::new(BackupSnapshotJob::new(
            Arc::clone(db),
            config.backup.directory.clone(),
            config.backup.retention,
        )),
    };

    Ok(StartupDeps {
        reporter,
        versions,
        preferences: prefs,
        package_metadata,
        storage,
        recovery,
        upgrade,
        scheduler,
        advisor,
        jobs,
    })
}
