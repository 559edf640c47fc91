//! SQLite storage engine

use std::sync::Arc;

use async_trait::async_trait;
use liftoff_core::StorageEngine;
use liftoff_domain::Result;
use tracing::{debug, info};

use super::manager::DbManager;
use crate::errors::conversions::to_domain;

/// The task database as seen by the startup sequence.
pub struct SqliteStorage {
    name: String,
    db: Arc<DbManager>,
}

impl SqliteStorage {
    pub fn new(name: impl Into<String>, db: Arc<DbManager>) -> Self {
        Self { name: name.into(), db }
    }
}

#[async_trait]
impl StorageEngine for SqliteStorage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open_for_writing(&self) -> Result<()> {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || db.run_migrations()).await.map_err(to_domain)??;
        info!(db_path = %self.db.path().display(), "storage.opened");
        Ok(())
    }

    async fn cleanup(&self) -> Result<()> {
        let db = Arc::clone(&self.db);
        let (tasks, reminders, alarms) = tokio::task::spawn_blocking(move || -> Result<_> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(to_domain)?;

            let tasks = tx
                .execute(
                    "DELETE FROM tasks WHERE deleted_at IS NOT NULL OR trim(title) = ''",
                    [],
                )
                .map_err(to_domain)?;
            let reminders = tx
                .execute(
                    "DELETE FROM reminders WHERE task_id IN \
                     (SELECT id FROM tasks WHERE completed_at IS NOT NULL)",
                    [],
                )
                .map_err(to_domain)?;
            let alarms = tx
                .execute(
                    "DELETE FROM alarms WHERE task_id IN \
                     (SELECT id FROM tasks WHERE completed_at IS NOT NULL)",
                    [],
                )
                .map_err(to_domain)?;

            tx.commit().map_err(to_domain)?;
            conn.execute_batch("PRAGMA optimize;").map_err(to_domain)?;
            Ok((tasks, reminders, alarms))
        })
        .await
        .map_err(to_domain)??;

        debug!(tasks, reminders, alarms, "storage.cleanup.completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use liftoff_domain::AppEnvironment;
    use tempfile::TempDir;

    use super::*;

    fn storage(dir: &TempDir) -> SqliteStorage {
        SqliteStorage::new("tasks.db", Arc::new(DbManager::new(dir.path().join("tasks.db"), 2)))
    }

    #[tokio::test]
    async fn open_creates_the_storage_file() {
        let dir = TempDir::new().expect("temp dir");
        let storage = storage(&dir);
        let env = AppEnvironment {
            package_id: "com.liftoff.tasks".into(),
            data_dir: dir.path().to_path_buf(),
            backup_dir: dir.path().join("backups"),
            restricted_build: false,
        };

        assert!(!storage.path_exists(&env));
        storage.open_for_writing().await.expect("opens");
        assert!(storage.path_exists(&env));
    }

    #[tokio::test]
    async fn cleanup_drops_deleted_and_blank_tasks_and_stale_reminders() {
        let dir = TempDir::new().expect("temp dir");
        let storage = storage(&dir);
        storage.open_for_writing().await.expect("opens");

        {
            let conn = storage.db.get_connection().expect("connection");
            conn.execute_batch(
                "INSERT INTO tasks (id, title) VALUES (1, 'keep');
                 INSERT INTO tasks (id, title, deleted_at) VALUES (2, 'gone', 10);
                 INSERT INTO tasks (id, title) VALUES (3, '   ');
                 INSERT INTO tasks (id, title, completed_at) VALUES (4, 'done', 20);
                 INSERT INTO reminders (task_id, fire_at) VALUES (1, 100), (4, 200);",
            )
            .expect("seed");
        }

        storage.cleanup().await.expect("cleanup");

        let conn = storage.db.get_connection().expect("connection");
        let tasks: i64 =
            conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0)).expect("count");
        let mut stmt = conn.prepare("SELECT task_id FROM reminders").expect("prepare");
        let reminders: Vec<i64> = stmt
            .query_map([], |row| row.get(0))
            .expect("query")
            .collect::<rusqlite::Result<_>>()
            .expect("reminders");
        assert_eq!(tasks, 2);
        assert_eq!(reminders, vec![1]);
    }
}
