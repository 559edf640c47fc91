//! Full restore of a backup snapshot into the storage file

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use liftoff_core::BackupImporter;
use liftoff_domain::{AppEnvironment, LiftoffError, Result};
use rusqlite::{Connection, OpenFlags};
use tracing::info;

use crate::database::DbManager;
use crate::errors::conversions::to_domain;

/// Replaces the storage file with a verified copy of a snapshot.
///
/// Nothing is merged: whatever the storage file held before is discarded.
pub struct SqliteBackupImporter {
    db: Arc<DbManager>,
}

impl SqliteBackupImporter {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BackupImporter for SqliteBackupImporter {
    async fn import(&self, environment: &AppEnvironment, artifact: &Path) -> Result<()> {
        let db = Arc::clone(&self.db);
        let artifact = artifact.to_path_buf();
        let data_dir = environment.data_dir.clone();

        let target = tokio::task::spawn_blocking(move || restore(&db, &artifact, &data_dir))
            .await
            .map_err(to_domain)??;

        info!(target = %target.display(), "backup.import.completed");
        Ok(())
    }
}

fn restore(db: &DbManager, artifact: &Path, data_dir: &Path) -> Result<PathBuf> {
    verify(artifact)?;

    std::fs::create_dir_all(data_dir).map_err(to_domain)?;
    db.close();

    let target = db.path().to_path_buf();
    let mut staging = target.as_os_str().to_owned();
    staging.push(".restore");
    let staging = PathBuf::from(staging);

    std::fs::copy(artifact, &staging).map_err(to_domain)?;
    std::fs::rename(&staging, &target).map_err(to_domain)?;
    Ok(target)
}

/// Open the snapshot read-only and run an integrity check.
fn verify(artifact: &Path) -> Result<()> {
    let conn = Connection::open_with_flags(
        artifact,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(to_domain)?;

    let verdict: String =
        conn.query_row("PRAGMA quick_check", [], |row| row.get(0)).map_err(to_domain)?;
    if verdict != "ok" {
        return Err(LiftoffError::Backup(format!(
            "snapshot {} failed integrity check: {verdict}",
            artifact.display()
        )));
    }
    Ok(())
}
