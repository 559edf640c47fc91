//! Periodic backup snapshots
//!
//! Each run writes a consistent copy of the storage file into the backup
//! directory with `VACUUM INTO` and prunes the directory down to the
//! configured retention, newest first.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use liftoff_core::JobHandler;
use liftoff_domain::{BackupArtifact, Result};
use tracing::{debug, info, warn};

use super::catalog::scan_directory;
use crate::database::DbManager;
use crate::errors::conversions::to_domain;

const SNAPSHOT_PREFIX: &str = "snapshot-";

pub struct BackupSnapshotJob {
    db: Arc<DbManager>,
    directory: PathBuf,
    retention: usize,
}

impl BackupSnapshotJob {
    pub fn new(db: Arc<DbManager>, directory: impl Into<PathBuf>, retention: usize) -> Self {
        Self { db, directory: directory.into(), retention: retention.max(1) }
    }

    /// Take one snapshot now. Returns `None` when there is nothing to copy.
    pub async fn snapshot(&self) -> Result<Option<PathBuf>> {
        if !self.db.path().exists() {
            debug!(db_path = %self.db.path().display(), "backup.snapshot.no_storage");
            return Ok(None);
        }

        let db = Arc::clone(&self.db);
        let directory = self.directory.clone();
        let retention = self.retention;

        let (path, pruned) = tokio::task::spawn_blocking(move || -> Result<_> {
            let path = write_snapshot(&db, &directory)?;
            let pruned = prune(&directory, retention)?;
            Ok((path, pruned))
        })
        .await
        .map_err(to_domain)??;

        info!(path = %path.display(), pruned, "backup.snapshot.written");
        Ok(Some(path))
    }
}

#[async_trait]
impl JobHandler for BackupSnapshotJob {
    async fn run(&self) -> Result<()> {
        self.snapshot().await.map(|_| ())
    }
}

fn write_snapshot(db: &DbManager, directory: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(directory).map_err(to_domain)?;

    let stamp = Utc::now().format("%Y%m%dT%H%M%S%3fZ");
    let path = directory.join(format!("{SNAPSHOT_PREFIX}{stamp}.db"));

    let conn = db.get_connection()?;
    conn.execute("VACUUM INTO ?1", [path.to_string_lossy().as_ref()]).map_err(to_domain)?;
    Ok(path)
}

/// Delete snapshots beyond `retention`. Files not written by this job are
/// left alone.
fn prune(directory: &Path, retention: usize) -> Result<usize> {
    let mut snapshots: Vec<BackupArtifact> = scan_directory(directory)?
        .into_iter()
        .filter(|artifact| {
            artifact
                .path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(SNAPSHOT_PREFIX))
        })
        .collect();
    BackupArtifact::sort_newest_first(&mut snapshots);

    let mut pruned = 0;
    for stale in snapshots.iter().skip(retention) {
        match std::fs::remove_file(&stale.path) {
            Ok(()) => pruned += 1,
            Err(err) => {
                warn!(path = %stale.path.display(), error = %err, "backup.snapshot.prune_failed")
            }
        }
    }
    Ok(pruned)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn skips_when_storage_was_never_created() {
        let dir = TempDir::new().expect("temp dir");
        let db = Arc::new(DbManager::new(dir.path().join("tasks.db"), 1));
        let job = BackupSnapshotJob::new(db, dir.path().join("backups"), 3);

        assert_eq!(job.snapshot().await.expect("runs"), None);
        assert!(!dir.path().join("backups").exists());
    }

    #[tokio::test]
    async fn snapshots_are_restorable_and_pruned() {
        let dir = TempDir::new().expect("temp dir");
        let backups = dir.path().join("backups");
        let db = Arc::new(DbManager::new(dir.path().join("tasks.db"), 1));
        db.run_migrations().expect("schema");
        db.get_connection()
            .expect("connection")
            .execute("INSERT INTO tasks (title) VALUES ('water plants')", [])
            .expect("insert");

        std::fs::create_dir_all(&backups).expect("mkdir");
        std::fs::write(backups.join("manual-export.db"), b"keep me").expect("foreign file");

        let job = BackupSnapshotJob::new(Arc::clone(&db), &backups, 2);
        let mut written = Vec::new();
        for _ in 0..3 {
            written.push(job.snapshot().await.expect("snapshot").expect("path"));
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let remaining = scan_directory(&backups).expect("scan");
        assert_eq!(remaining.len(), 3, "two snapshots plus the foreign file");
        assert!(!written[0].exists());

        let conn = rusqlite::Connection::open(&written[2]).expect("open snapshot");
        let title: String =
            conn.query_row("SELECT title FROM tasks", [], |row| row.get(0)).expect("row");
        assert_eq!(title, "water plants");
    }
}
