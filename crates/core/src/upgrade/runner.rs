//! Ordered migration runner.

use std::sync::Arc;

use liftoff_domain::{AppEnvironment, LiftoffError, Result};
use tracing::{debug, info, warn};

use super::ports::{Migration, Normalization};
use crate::observability_ports::ErrorReporter;

/// A migration together with the version that introduced it.
#[derive(Clone)]
pub struct MigrationStep {
    pub threshold: u32,
    pub migration: Arc<dyn Migration>,
}

impl MigrationStep {
    /// Whether upgrading from `old` to `new` crosses this step.
    pub fn applies(&self, old: u32, new: u32) -> bool {
        old < self.threshold && self.threshold <= new
    }
}

impl std::fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationStep")
            .field("threshold", &self.threshold)
            .field("migration", &self.migration.name())
            .finish()
    }
}

/// Applies versioned migrations and the secondary normalization pass.
pub struct UpgradeRunner {
    steps: Vec<MigrationStep>,
    normalizations: Vec<Arc<dyn Normalization>>,
    reporter: Arc<dyn ErrorReporter>,
}

impl UpgradeRunner {
    pub fn new(reporter: Arc<dyn ErrorReporter>) -> Self {
        Self { steps: Vec::new(), normalizations: Vec::new(), reporter }
    }

    /// Register a migration introduced by version `threshold`.
    ///
    /// Steps are kept sorted by threshold; equal thresholds keep
    /// registration order.
    pub fn with_step(mut self, threshold: u32, migration: Arc<dyn Migration>) -> Self {
        self.steps.push(MigrationStep { threshold, migration });
        self.steps.sort_by_key(|step| step.threshold);
        self
    }

    pub fn with_normalization(mut self, normalization: Arc<dyn Normalization>) -> Self {
        self.normalizations.push(normalization);
        self
    }

    /// Steps crossed by an upgrade from `old` to `new`, ascending.
    pub fn pending_steps(&self, old: u32, new: u32) -> impl Iterator<Item = &MigrationStep> {
        self.steps.iter().filter(move |step| step.applies(old, new))
    }

    /// Apply every step crossed between `old` and `new`.
    ///
    /// Stops at the first failure; the caller must then leave the recorded
    /// version untouched. Returns the number of applied steps.
    pub async fn apply_versioned_migration(&self, old: u32, new: u32) -> Result<usize> {
        let mut applied = 0;
        for step in self.pending_steps(old, new) {
            let name = step.migration.name();
            debug!(threshold = step.threshold, step = name, "startup.migration.step_begin");

            step.migration.apply().await.map_err(|err| {
                LiftoffError::Migration(format!(
                    "step {} ({name}) failed: {err}",
                    step.threshold
                ))
            })?;

            info!(threshold = step.threshold, step = name, "startup.migration.step_applied");
            applied += 1;
        }
        Ok(applied)
    }

    /// Run every normalization; failures are reported and skipped.
    ///
    /// Returns the names of the normalizations that failed.
    pub async fn apply_secondary_normalization(&self, environment: &AppEnvironment) -> Vec<String> {
        let mut failed = Vec::new();
        for normalization in &self.normalizations {
            if let Err(err) = normalization.apply(environment).await {
                warn!(step = normalization.name(), error = %err, "startup.normalization.failed");
                self.reporter.report_error("startup-normalization", &err);
                failed.push(normalization.name().to_string());
            }
        }
        failed
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;

    struct Recording {
        name: String,
        log: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl Migration for Recording {
        fn name(&self) -> &str {
            &self.name
        }

        async fn apply(&self) -> Result<()> {
            self.log.lock().push(self.name.clone());
            if self.fail {
                return Err(LiftoffError::Storage("disk full".into()));
            }
            Ok(())
        }
    }

    struct SilentReporter;

    impl ErrorReporter for SilentReporter {
        fn report_error(&self, _tag: &str, _error: &(dyn std::error::Error + 'static)) {}
    }

    fn step(name: &str, log: &Arc<Mutex<Vec<String>>>, fail: bool) -> Arc<dyn Migration> {
        Arc::new(Recording { name: name.into(), log: Arc::clone(log), fail })
    }

    #[test]
    fn threshold_is_exclusive_below_and_inclusive_above() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let step = MigrationStep { threshold: 120, migration: step("x", &log, false) };

        assert!(step.applies(119, 120));
        assert!(!step.applies(120, 135));
        assert!(!step.applies(100, 119));
    }

    #[tokio::test]
    async fn steps_run_in_threshold_order_regardless_of_registration() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let runner = UpgradeRunner::new(Arc::new(SilentReporter))
            .with_step(130, step("c", &log, false))
            .with_step(110, step("a", &log, false))
            .with_step(120, step("b", &log, false));

        let applied = runner.apply_versioned_migration(100, 135).await.expect("migrates");

        assert_eq!(applied, 3);
        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn failure_stops_later_steps() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let runner = UpgradeRunner::new(Arc::new(SilentReporter))
            .with_step(110, step("a", &log, false))
            .with_step(120, step("b", &log, true))
            .with_step(130, step("c", &log, false));

        let err = runner.apply_versioned_migration(100, 135).await.expect_err("fails");

        assert!(matches!(err, LiftoffError::Migration(ref msg) if msg.contains("step 120 (b)")));
        assert_eq!(*log.lock(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn downgrade_applies_nothing() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let runner =
            UpgradeRunner::new(Arc::new(SilentReporter)).with_step(110, step("a", &log, false));

        assert_eq!(runner.apply_versioned_migration(135, 100).await.expect("ok"), 0);
        assert!(log.lock().is_empty());
    }
}
