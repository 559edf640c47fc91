//! Restores the newest backup when the storage file vanished.
//!
//! The inspector only acts when the application demonstrably ran before
//! (the recorded version is above the stable-storage threshold) and yet
//! the storage file is missing. Every failure degrades to "start with
//! empty data"; nothing here may keep the application from starting.

use std::sync::Arc;

use liftoff_domain::constants::EVENT_LOST_DATA_RESTORED;
use liftoff_domain::{AppEnvironment, BackupArtifact, RestoreOutcome, Result};
use tracing::{debug, info, warn};

use super::ports::{BackupCatalog, BackupImporter};
use crate::observability_ports::AnalyticsPort;
use crate::storage_ports::StorageEngine;

/// Detects lost storage and restores it from the newest backup.
pub struct RecoveryInspector {
    storage: Arc<dyn StorageEngine>,
    catalog: Arc<dyn BackupCatalog>,
    importer: Arc<dyn BackupImporter>,
    analytics: Arc<dyn AnalyticsPort>,
    stable_storage_version: u32,
}

impl RecoveryInspector {
    pub fn new(
            storage: Arc<dyn StorageEngine>,
        catalog: Arc<dyn BackupCatalog>,
        importer: Arc<dyn BackupImporter>,
        analytics: Arc<dyn AnalyticsPort>,
        stable_storage_version: u32,
    ) -> Self {
        Self { storage, catalog, importer, analytics, stable_storage_version }
    }

    /// Restore the newest backup if storage is missing. `recorded` is the
    /// version the previous run left behind.
    ///
    /// Never fails: errors are logged and reported as
    /// [`RestoreOutcome::Failed`].
    pub async fn maybe_restore(
        &self,
        environment: &AppEnvironment,
        recorded: u32,
    ) -> RestoreOutcome {
        match self.try_restore(environment, recorded).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "startup.restore.failed");
                RestoreOutcome::Failed { reason: err.to_string() }
            }
        }
    }

    async fn try_restore(
        &self,
        environment: &AppEnvironment,
        recorded: u32,
    ) -> Result<RestoreOutcome> {
        if recorded <= self.stable_storage_version {
            debug!(recorded, threshold = self.stable_storage_version, "startup.restore.first_run");
            return Ok(RestoreOutcome::NotNeeded);
        }
        if self.storage.path_exists(environment) {
            return Ok(RestoreOutcome::NotNeeded);
        }

        warn!(storage = self.storage.name(), recorded, "startup.restore.storage_missing");

        let artifacts = self.catalog.list(environment.backup_dir()).await?;
        let Some(newest) = BackupArtifact::newest(&artifacts) else {
            info!(dir = %environment.backup_dir().display(), "startup.restore.no_backups");
            return Ok(RestoreOutcome::NoBackups);
        };

        self.importer.import(environment, &newest.path).await?;
        self.analytics.record_event(EVENT_LOST_DATA_RESTORED);

        info!(
            path = %newest.path.display(),
            modified = %newest.modified,
            candidates = artifacts.len(),
            "startup.restore.completed"
        );
        Ok(RestoreOutcome::Restored { path: newest.path.clone() })
    }
}
