//! Versioned SQL migrations

use std::sync::Arc;

use async_trait::async_trait;
use liftoff_core::Migration;
use liftoff_domain::Result;
use tracing::debug;

use super::manager::DbManager;
use crate::errors::conversions::to_domain;

/// A SQL batch applied in a single transaction.
///
/// The base schema is ensured first, so a migration also works against a
/// storage file that has never been opened.
pub struct SqlMigration {
    name: String,
    sql: String,
    db: Arc<DbManager>,
}

impl SqlMigration {
    pub fn new(name: impl Into<String>, sql: impl Into<String>, db: Arc<DbManager>) -> Self {
        Self { name: name.into(), sql: sql.into(), db }
    }
}

#[async_trait]
impl Migration for SqlMigration {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self) -> Result<()> {
        let db = Arc::clone(&self.db);
        let sql = self.sql.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            db.run_migrations()?;
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(to_domain)?;
            tx.execute_batch(&sql).map_err(to_domain)?;
            tx.commit().map_err(to_domain)
        })
        .await
        .map_err(to_domain)??;

        debug!(migration = %self.name, "storage.migration.applied");
        Ok(())
    }
}

/// Migrations shipped with the application, keyed by the version that
/// introduced them.
pub fn builtin_migrations(db: &Arc<DbManager>) -> Vec<(u32, Arc<dyn Migration>)> {
    let due_date_index: Arc<dyn Migration> = Arc::new(SqlMigration::new(
        "index-task-due-dates",
        "CREATE INDEX IF NOT EXISTS idx_tasks_due_at ON tasks(due_at);",
        Arc::clone(db),
    ));
    let orphaned_alarms: Arc<dyn Migration> = Arc::new(SqlMigration::new(
        "drop-orphaned-alarms",
        "DELETE FROM alarms WHERE task_id NOT IN (SELECT id FROM tasks);
         DELETE FROM reminders WHERE task_id NOT IN (SELECT id FROM tasks);",
        Arc::clone(db),
    ));

    vec![(136, due_date_index), (140, orphaned_alarms)]
}
