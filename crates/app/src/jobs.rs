//! Job handlers registered during startup, plus the headless advisory
//! prompt used by the binary.

use std::sync::Arc;

use async_trait::async_trait;
use liftoff_core::{AdvisoryPrompt, JobHandler, PreferenceStore};
use liftoff_domain::constants::PREF_SYNC_ONGOING;
use liftoff_domain::{LiftoffError, PromptResponse, Result};
use liftoff_infra::DbManager;
use tracing::{debug, info, warn};

/// Recounts open tasks for the home-screen widget.
pub struct WidgetRefreshJob {
    db: Arc<DbManager>,
}

impl WidgetRefreshJob {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    pub async fn open_tasks(&self) -> Result<i64> {
        if !self.db.path().exists() {
            return Ok(0);
        }
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || -> Result<i64> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT COUNT(*) FROM tasks WHERE completed_at IS NULL AND deleted_at IS NULL",
                [],
                |row| row.get(0),
            )
            .map_err(|e| LiftoffError::Storage(e.to_string()))
        })
        .await
        .map_err(|e| LiftoffError::Internal(format!("widget refresh task failed: {e}")))?
    }
}

#[async_trait]
impl JobHandler for WidgetRefreshJob {
    async fn run(&self) -> Result<()> {
        let open = self.open_tasks().await?;
        info!(open_tasks = open, "widget.refreshed");
        Ok(())
    }
}

/// Periodic remote sync.
///
/// No remote endpoint is wired yet, so a run only maintains the
/// `sync_ongoing` flag that startup clears after a crash mid-sync.
pub struct RemoteSyncJob {
    preferences: Arc<dyn PreferenceStore>,
}

impl RemoteSyncJob {
    pub fn new(preferences: Arc<dyn PreferenceStore>) -> Self {
        Self { preferences }
    }
}

#[async_trait]
impl JobHandler for RemoteSyncJob {
    async fn run(&self) -> Result<()> {
        self.preferences.set_bool(PREF_SYNC_ONGOING, true).await?;
        debug!("sync.remote.no_endpoint");
        self.preferences.set_bool(PREF_SYNC_ONGOING, false).await
    }
}

/// Writes the task-killer notice to the log instead of a dialog.
pub struct LoggingPrompt;

#[async_trait]
impl AdvisoryPrompt for LoggingPrompt {
    async fn show_task_killer_notice(&self, app_label: &str) -> Result<PromptResponse> {
        warn!(
            app = app_label,
            "advisory.task_killer: this utility may stop scheduled reminders; exclude Liftoff from it"
        );
        Ok(PromptResponse::Acknowledged)
    }
}
