//! Shared test helpers for `liftoff-core` integration tests.
//!
//! Hand-written mocks for every startup port plus a [`Fixture`] that wires
//! them into a [`StartupOrchestrator`], so tests only state what differs
//! from a healthy environment.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use liftoff_core::{
    AdvisoryPrompt, AlarmSchedule, AnalyticsPort, ApplicationCatalog, BackgroundScheduler,
    BackupCatalog, BackupImporter, ErrorReporter, JobHandler, Migration, Normalization,
    PackageMetadata, PreferenceStore, RecoveryInspector, ScheduledJob, StartupDeps, StartupJobs,
    StartupOrchestrator, StartupSettings, StorageEngine, TaskKillerAdvisor, TimerService,
    UpgradeRunner, VersionStore,
};
use liftoff_domain::{
    AppEnvironment, BackupArtifact, InstalledApplication, JobKind, LiftoffError, PreferenceValue,
    PromptResponse, Result, Trigger,
};
use parking_lot::Mutex;

// ----------------------------------------------------------------------------
// Observability
// ----------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingReporter {
    tags: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn tags(&self) -> Vec<String> {
        self.tags.lock().clone()
    }

    pub fn has(&self, tag: &str) -> bool {
        self.tags.lock().iter().any(|t| t == tag)
    }
}

impl ErrorReporter for RecordingReporter {
    fn report_error(&self, tag: &str, _error: &(dyn std::error::Error + 'static)) {
        self.tags.lock().push(tag.to_string());
    }
}

#[derive(Default)]
pub struct RecordingAnalytics {
    events: Mutex<Vec<String>>,
}

impl RecordingAnalytics {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl AnalyticsPort for RecordingAnalytics {
    fn record_event(&self, name: &str) {
        self.events.lock().push(name.to_string());
    }
}

// ----------------------------------------------------------------------------
// Preferences
// ----------------------------------------------------------------------------

/// In-memory version record and preference map.
#[derive(Default)]
pub struct MemoryPreferences {
    version: AtomicU32,
    values: Mutex<BTreeMap<String, PreferenceValue>>,
    pub version_reads: AtomicUsize,
    pub version_writes: AtomicUsize,
    pub fail_version_write: AtomicBool,
}

impl MemoryPreferences {
    pub fn with_version(version: u32) -> Self {
        let prefs = Self::default();
        prefs.version.store(version, Ordering::SeqCst);
        prefs
    }

    pub fn version(&self) -> u32 {
        self.version.load(Ordering::SeqCst)
    }

    pub fn value(&self, key: &str) -> Option<PreferenceValue> {
        self.values.lock().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: PreferenceValue) {
        self.values.lock().insert(key.to_string(), value);
    }
}

#[async_trait]
impl VersionStore for MemoryPreferences {
    async fn current_version(&self) -> Result<u32> {
        self.version_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.version())
    }

    async fn set_current_version(&self, version: u32) -> Result<()> {
        if self.fail_version_write.load(Ordering::SeqCst) {
            return Err(LiftoffError::Storage("preferences are read-only".into()));
        }
        self.version_writes.fetch_add(1, Ordering::SeqCst);
        self.version.store(version, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferences {
    async fn get(&self, key: &str) -> Result<Option<PreferenceValue>> {
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: PreferenceValue) -> Result<()> {
        self.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().remove(key);
        Ok(())
    }

    async fn apply_defaults(&self, defaults: &BTreeMap<String, PreferenceValue>) -> Result<usize> {
        let mut values = self.values.lock();
        let mut written = 0;
        for (key, value) in defaults {
            if !values.contains_key(key) {
                values.insert(key.clone(), value.clone());
                written += 1;
            }
        }
        Ok(written)
    }
}

// ----------------------------------------------------------------------------
// Package metadata and storage
// ----------------------------------------------------------------------------

/// Returns a fixed version code, or fails when `None`.
pub struct FixedPackageMetadata(pub Option<u32>);

#[async_trait]
impl PackageMetadata for FixedPackageMetadata {
    async fn version_code(&self, package_id: &str) -> Result<u32> {
        self.0.ok_or_else(|| LiftoffError::NotFound(format!("package {package_id}")))
    }
}

pub struct MockStorage {
    pub exists: AtomicBool,
    pub opens: AtomicUsize,
    pub cleanups: AtomicUsize,
    pub fail_open: AtomicBool,
    pub fail_cleanup: AtomicBool,
}

impl MockStorage {
    pub fn present() -> Self {
        Self {
            exists: AtomicBool::new(true),
            opens: AtomicUsize::new(0),
            cleanups: AtomicUsize::new(0),
            fail_open: AtomicBool::new(false),
            fail_cleanup: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl StorageEngine for MockStorage {
    fn name(&self) -> &str {
        "tasks.db"
    }

    fn path_exists(&self, _environment: &AppEnvironment) -> bool {
        self.exists.load(Ordering::SeqCst)
    }

    async fn open_for_writing(&self) -> Result<()> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(LiftoffError::Storage("database is locked".into()));
        }
        self.exists.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn cleanup(&self) -> Result<()> {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
        if self.fail_cleanup.load(Ordering::SeqCst) {
            return Err(LiftoffError::Storage("vacuum failed".into()));
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Backups
// ----------------------------------------------------------------------------

#[derive(Default)]
pub struct StaticBackupCatalog {
    pub artifacts: Mutex<Vec<BackupArtifact>>,
    pub listings: AtomicUsize,
}

#[async_trait]
impl BackupCatalog for StaticBackupCatalog {
    async fn list(&self, _directory: &Path) -> Result<Vec<BackupArtifact>> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        Ok(self.artifacts.lock().clone())
    }
}

#[derive(Default)]
pub struct RecordingImporter {
    imported: Mutex<Vec<PathBuf>>,
}

impl RecordingImporter {
    pub fn imported(&self) -> Vec<PathBuf> {
        self.imported.lock().clone()
    }
}

#[async_trait]
impl BackupImporter for RecordingImporter {
    async fn import(&self, _environment: &AppEnvironment, artifact: &Path) -> Result<()> {
        self.imported.lock().push(artifact.to_path_buf());
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Upgrades
// ----------------------------------------------------------------------------

pub struct RecordingMigration {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingMigration {
    pub fn new(name: &str, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self { name: name.into(), log: Arc::clone(log), fail: false })
    }

    pub fn failing(name: &str, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self { name: name.into(), log: Arc::clone(log), fail: true })
    }
}

#[async_trait]
impl Migration for RecordingMigration {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self) -> Result<()> {
        self.log.lock().push(self.name.clone());
        if self.fail {
            return Err(LiftoffError::Storage(format!("{} hit a constraint", self.name)));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingNormalization {
    pub runs: AtomicUsize,
}

#[async_trait]
impl Normalization for CountingNormalization {
    fn name(&self) -> &str {
        "counting"
    }

    async fn apply(&self, _environment: &AppEnvironment) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Scheduling
// ----------------------------------------------------------------------------

/// Timer service keeping registrations in a map keyed like the real one.
#[derive(Default)]
pub struct InMemoryTimer {
    jobs: Mutex<BTreeMap<String, ScheduledJob>>,
    pub registrations: AtomicUsize,
    failing_keys: Mutex<HashSet<String>>,
}

impl InMemoryTimer {
    pub fn fail_on(&self, key: &str) {
        self.failing_keys.lock().insert(key.to_string());
    }

    pub fn keys(&self) -> Vec<String> {
        self.jobs.lock().keys().cloned().collect()
    }

    pub fn job(&self, key: &str) -> Option<ScheduledJob> {
        self.jobs.lock().get(key).cloned()
    }

    pub fn count_kind(&self, kind: JobKind) -> usize {
        self.jobs.lock().values().filter(|job| job.kind == kind).count()
    }
}

#[async_trait]
impl TimerService for InMemoryTimer {
    async fn register(&self, job: ScheduledJob) -> Result<()> {
        if self.failing_keys.lock().contains(&job.key) {
            return Err(LiftoffError::Scheduling(format!("cannot register {}", job.key)));
        }
        self.registrations.fetch_add(1, Ordering::SeqCst);
        self.jobs.lock().insert(job.key.clone(), job);
        Ok(())
    }

    async fn cancel(&self, key: &str) -> Result<bool> {
        Ok(self.jobs.lock().remove(key).is_some())
    }

    async fn pending(&self) -> Result<Vec<String>> {
        Ok(self.keys())
    }
}

/// Alarm schedule that re-registers one timer per pending row.
pub struct RowAlarmSchedule {
    name: String,
    timer: Arc<InMemoryTimer>,
    rows: Vec<i64>,
    pub runs: AtomicUsize,
    pub fail: AtomicBool,
}

impl RowAlarmSchedule {
    pub fn new(name: &str, timer: &Arc<InMemoryTimer>, rows: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            timer: Arc::clone(timer),
            rows,
            runs: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl AlarmSchedule for RowAlarmSchedule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn schedule_all_alarms(&self) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(LiftoffError::Scheduling(format!("{} table unreadable", self.name)));
        }
        for id in &self.rows {
            self.timer
                .register(ScheduledJob {
                    key: format!("{}:{id}", self.name),
                    kind: JobKind::OneShotReminder,
                    trigger: Trigger::At(chrono::Utc::now()),
                    handler: Arc::new(NoopJob),
                })
                .await?;
        }
        Ok(())
    }
}

pub struct NoopJob;

#[async_trait]
impl JobHandler for NoopJob {
    async fn run(&self) -> Result<()> {
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Advisory
// ----------------------------------------------------------------------------

#[derive(Default)]
pub struct StaticApplicationCatalog {
    pub apps: Vec<InstalledApplication>,
    pub scans: AtomicUsize,
}

#[async_trait]
impl ApplicationCatalog for StaticApplicationCatalog {
    async fn installed_applications(
        &self,
        _with_permissions: bool,
    ) -> Result<Vec<InstalledApplication>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        Ok(self.apps.clone())
    }
}

#[derive(Default)]
pub struct RecordingPrompt {
    shown: Mutex<Vec<String>>,
}

impl RecordingPrompt {
    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().clone()
    }
}

#[async_trait]
impl AdvisoryPrompt for RecordingPrompt {
    async fn show_task_killer_notice(&self, app_label: &str) -> Result<PromptResponse> {
        self.shown.lock().push(app_label.to_string());
        Ok(PromptResponse::Acknowledged)
    }
}

pub fn task_killer(package: &str, label: &str) -> InstalledApplication {
    InstalledApplication {
        package_name: package.into(),
        label: label.into(),
        requested_permissions: Some(vec!["restart-packages".into()]),
    }
}

// ----------------------------------------------------------------------------
// Fixture
// ----------------------------------------------------------------------------

pub fn environment() -> AppEnvironment {
    AppEnvironment {
        package_id: "com.liftoff.tasks".into(),
        data_dir: PathBuf::from("/var/lib/liftoff"),
        backup_dir: PathBuf::from("/var/lib/liftoff/backups"),
        restricted_build: false,
    }
}

/// Mocks for a healthy environment; tweak fields before calling `build`.
pub struct Fixture {
    pub reporter: Arc<RecordingReporter>,
    pub analytics: Arc<RecordingAnalytics>,
    pub preferences: Arc<MemoryPreferences>,
    pub package: Option<u32>,
    pub storage: Arc<MockStorage>,
    pub catalog: Arc<StaticBackupCatalog>,
    pub importer: Arc<RecordingImporter>,
    pub migration_log: Arc<Mutex<Vec<String>>>,
    pub migrations: Vec<(u32, Arc<dyn Migration>)>,
    pub normalization: Arc<CountingNormalization>,
    pub timer: Arc<InMemoryTimer>,
    pub reminders: Arc<RowAlarmSchedule>,
    pub alarms: Arc<RowAlarmSchedule>,
    pub apps: Arc<StaticApplicationCatalog>,
    pub prompt: Arc<RecordingPrompt>,
    pub settings: StartupSettings,
}

impl Fixture {
    /// Recorded and installed versions both set to `version`.
    pub fn at_version(version: u32) -> Self {
        let timer = Arc::new(InMemoryTimer::default());
        Self {
            reporter: Arc::new(RecordingReporter::default()),
            analytics: Arc::new(RecordingAnalytics::default()),
            preferences: Arc::new(MemoryPreferences::with_version(version)),
            package: Some(version),
            storage: Arc::new(MockStorage::present()),
            catalog: Arc::new(StaticBackupCatalog::default()),
            importer: Arc::new(RecordingImporter::default()),
            migration_log: Arc::new(Mutex::new(Vec::new())),
            migrations: Vec::new(),
            normalization: Arc::new(CountingNormalization::default()),
            reminders: Arc::new(RowAlarmSchedule::new("reminder", &timer, vec![1, 2])),
            alarms: Arc::new(RowAlarmSchedule::new("alarm", &timer, vec![7])),
            timer,
            apps: Arc::new(StaticApplicationCatalog::default()),
            prompt: Arc::new(RecordingPrompt::default()),
            settings: StartupSettings::default(),
        }
    }

    pub fn with_step(mut self, threshold: u32, name: &str) -> Self {
        let migration = RecordingMigration::new(name, &self.migration_log);
        self.migrations.push((threshold, migration));
        self
    }

    pub fn with_failing_step(mut self, threshold: u32, name: &str) -> Self {
        let migration = RecordingMigration::failing(name, &self.migration_log);
        self.migrations.push((threshold, migration));
        self
    }

    pub fn applied_steps(&self) -> Vec<String> {
        self.migration_log.lock().clone()
    }

    pub fn scheduler(&self) -> Arc<BackgroundScheduler> {
        Arc::new(BackgroundScheduler::new(
            Arc::clone(&self.timer) as Arc<dyn TimerService>,
            Arc::clone(&self.reminders) as Arc<dyn AlarmSchedule>,
            Arc::clone(&self.alarms) as Arc<dyn AlarmSchedule>,
            Arc::clone(&self.reporter) as Arc<dyn ErrorReporter>,
        ))
    }

    pub fn build(&self) -> StartupOrchestrator {
        let reporter: Arc<dyn ErrorReporter> = self.reporter.clone();

        let recovery = RecoveryInspector::new(
            self.storage.clone(),
            self.catalog.clone(),
            self.importer.clone(),
            self.analytics.clone(),
            135,
        );

        let upgrade = self
            .migrations
            .iter()
            .fold(UpgradeRunner::new(Arc::clone(&reporter)), |runner, (threshold, step)| {
                runner.with_step(*threshold, Arc::clone(step))
            })
            .with_normalization(self.normalization.clone());

        let advisor =
            TaskKillerAdvisor::new(self.apps.clone(), self.prompt.clone(), self.preferences.clone());

        let deps = StartupDeps {
            reporter,
            versions: self.preferences.clone(),
            preferences: self.preferences.clone(),
            package_metadata: Arc::new(FixedPackageMetadata(self.package)),
            storage: self.storage.clone(),
            recovery: Arc::new(recovery),
            upgrade: Arc::new(upgrade),
            scheduler: self.scheduler(),
            advisor: Arc::new(advisor),
            jobs: StartupJobs {
                widget_refresh: Arc::new(NoopJob),
                remote_sync: Arc::new(NoopJob),
                backup_snapshot: Arc::new(NoopJob),
            },
        };

        StartupOrchestrator::new(deps, self.settings.clone())
    }
}
