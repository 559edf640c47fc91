//! Alarm schedules persisted in the task database.
//!
//! Each schedule owns one table of pending rows `(id, fire_at)` and mirrors
//! it into the timer service: one one-shot timer per row, keyed
//! `<table>:<id>`. Recomputing cancels timers whose rows disappeared and
//! re-registers the rest, so running it twice never duplicates a timer.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use liftoff_core::{AlarmSchedule, JobHandler, ScheduledJob, TimerService};
use liftoff_domain::{JobKind, LiftoffError, Result, Trigger};
use rusqlite::params;
use tracing::{debug, info, warn};

use crate::database::DbManager;
use crate::errors::conversions::to_domain;

pub struct PersistedAlarmSchedule {
    name: String,
    table: String,
    db: Arc<DbManager>,
    timer: Arc<dyn TimerService>,
}

impl PersistedAlarmSchedule {
    /// `table` is interpolated into SQL, so only `[A-Za-z0-9_]` is accepted.
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        db: Arc<DbManager>,
        timer: Arc<dyn TimerService>,
    ) -> Result<Self> {
        let table = table.into();
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(LiftoffError::InvalidInput(format!("invalid alarm table name: {table}")));
        }
        Ok(Self { name: name.into(), table, db, timer })
    }

    /// Task reminders.
    pub fn reminders(db: Arc<DbManager>, timer: Arc<dyn TimerService>) -> Result<Self> {
        Self::new("reminder", "reminders", db, timer)
    }

    /// Due-date alarms.
    pub fn alarms(db: Arc<DbManager>, timer: Arc<dyn TimerService>) -> Result<Self> {
        Self::new("alarm", "alarms", db, timer)
    }

    fn key(&self, id: i64) -> String {
        format!("{}:{id}", self.table)
    }

    async fn pending_rows(&self) -> Result<Vec<(i64, i64)>> {
        let db = Arc::clone(&self.db);
        let sql = format!("SELECT id, fire_at FROM {} ORDER BY fire_at", self.table);
        tokio::task::spawn_blocking(move || -> Result<Vec<(i64, i64)>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(&sql).map_err(to_domain)?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
                .map_err(to_domain)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(to_domain)?;
            Ok(rows)
        })
        .await
        .map_err(to_domain)?
    }
}

#[async_trait]
impl AlarmSchedule for PersistedAlarmSchedule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn schedule_all_alarms(&self) -> Result<()> {
        let rows = self.pending_rows().await?;
        let wanted: HashSet<String> = rows.iter().map(|(id, _)| self.key(*id)).collect();

        let prefix = format!("{}:", self.table);
        let mut cancelled = 0;
        for key in self.timer.pending().await? {
            if key.starts_with(&prefix) && !wanted.contains(&key) && self.timer.cancel(&key).await? {
                cancelled += 1;
            }
        }

        let mut registered = 0;
        for (id, fire_at) in rows {
            let Some(instant) = DateTime::<Utc>::from_timestamp(fire_at, 0) else {
                warn!(table = %self.table, id, fire_at, "alarm.invalid_fire_time");
                continue;
            };
            let handler = Arc::new(FiredAlarm { table: self.table.clone(), id, db: Arc::clone(&self.db) });
            self.timer
                .register(ScheduledJob {
                    key: self.key(id),
                    kind: JobKind::OneShotReminder,
                    trigger: Trigger::At(instant),
                    handler,
                })
                .await?;
            registered += 1;
        }

        info!(schedule = %self.name, registered, cancelled, "alarm.schedule_recomputed");
        Ok(())
    }
}

/// Fires one alarm row and consumes it.
struct FiredAlarm {
    table: String,
    id: i64,
    db: Arc<DbManager>,
}

#[async_trait]
impl JobHandler for FiredAlarm {
    async fn run(&self) -> Result<()> {
        let db = Arc::clone(&self.db);
        let sql = format!("DELETE FROM {} WHERE id = ?1", self.table);
        let id = self.id;
        let removed = tokio::task::spawn_blocking(move || -> Result<usize> {
            db.get_connection()?.execute(&sql, params![id]).map_err(to_domain)
        })
        .await
        .map_err(to_domain)??;

        if removed == 0 {
            debug!(table = %self.table, id, "alarm.already_consumed");
        } else {
            info!(table = %self.table, id, "alarm.fired");
        }
        Ok(())
    }
}
