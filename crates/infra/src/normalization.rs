//! Normalizations applied on every startup
//!
//! Each one reconciles state that may have drifted regardless of which
//! version was installed before. All of them are idempotent.

use std::sync::Arc;

use async_trait::async_trait;
use liftoff_core::{Normalization, PreferenceStore};
use liftoff_domain::constants::{
    MAX_SYNC_INTERVAL_SECS, MIN_SYNC_INTERVAL_SECS, PREF_SYNC_INTERVAL,
};
use liftoff_domain::{AppEnvironment, Result};
use tracing::info;

use crate::errors::conversions::to_domain;

/// Recreates the backup directory if it was removed.
pub struct EnsureBackupDirectory;

#[async_trait]
impl Normalization for EnsureBackupDirectory {
    fn name(&self) -> &str {
        "ensure-backup-directory"
    }

    async fn apply(&self, environment: &AppEnvironment) -> Result<()> {
        let dir = environment.backup_dir();
        if tokio::fs::try_exists(dir).await.map_err(to_domain)? {
            return Ok(());
        }
        tokio::fs::create_dir_all(dir).await.map_err(to_domain)?;
        info!(path = %dir.display(), "normalization.backup_dir_created");
        Ok(())
    }
}

/// Pulls a stored sync interval back inside the supported range.
pub struct ClampSyncInterval {
    preferences: Arc<dyn PreferenceStore>,
}

impl ClampSyncInterval {
    pub fn new(preferences: Arc<dyn PreferenceStore>) -> Self {
        Self { preferences }
    }
}

#[async_trait]
impl Normalization for ClampSyncInterval {
    fn name(&self) -> &str {
        "clamp-sync-interval"
    }

    async fn apply(&self, _environment: &AppEnvironment) -> Result<()> {
        let Some(stored) = self.preferences.get_int(PREF_SYNC_INTERVAL).await? else {
            return Ok(());
        };
        let clamped = stored.clamp(MIN_SYNC_INTERVAL_SECS, MAX_SYNC_INTERVAL_SECS);
        if clamped != stored {
            self.preferences.set_int(PREF_SYNC_INTERVAL, clamped).await?;
            info!(stored, clamped, "normalization.sync_interval_clamped");
        }
        Ok(())
    }
}
