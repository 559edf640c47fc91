//! Backup directory listing

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use liftoff_core::BackupCatalog;
use liftoff_domain::{BackupArtifact, Result};
use tracing::debug;

use crate::errors::conversions::to_domain;

pub const BACKUP_EXTENSION: &str = "db";

/// Lists `*.db` files in a backup directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryBackupCatalog;

#[async_trait]
impl BackupCatalog for DirectoryBackupCatalog {
    async fn list(&self, directory: &Path) -> Result<Vec<BackupArtifact>> {
        let directory = directory.to_path_buf();
        tokio::task::spawn_blocking(move || scan_directory(&directory))
            .await
            .map_err(to_domain)?
    }
}

/// Blocking scan shared with the snapshot job's pruning.
pub(crate) fn scan_directory(directory: &Path) -> Result<Vec<BackupArtifact>> {
    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %directory.display(), "backup.catalog.directory_missing");
            return Ok(Vec::new());
        }
        Err(err) => return Err(to_domain(err)),
    };

    let mut artifacts = Vec::new();
    for entry in entries {
        let entry = entry.map_err(to_domain)?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
            continue;
        }
        let metadata = entry.metadata().map_err(to_domain)?;
        if !metadata.is_file() {
            continue;
        }
        let modified: DateTime<Utc> = metadata.modified().map_err(to_domain)?.into();
        artifacts.push(BackupArtifact::new(path, modified));
    }

    debug!(dir = %directory.display(), found = artifacts.len(), "backup.catalog.scanned");
    Ok(artifacts)
}
