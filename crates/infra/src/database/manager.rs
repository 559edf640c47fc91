//! Database connection manager backed by an r2d2 SQLite pool.
//!
//! The pool is created lazily on the first connection request so that the
//! storage file is never touched before the startup sequence has decided
//! whether it must be restored from a backup.

use std::path::{Path, PathBuf};

use liftoff_domain::Result;
use parking_lot::Mutex;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tracing::info;

use crate::errors::conversions::to_domain;

pub type SqlitePool = Pool<SqliteConnectionManager>;
pub type SqliteConnection = PooledConnection<SqliteConnectionManager>;

const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Database manager that owns the lazily created pool.
pub struct DbManager {
    path: PathBuf,
    pool_size: u32,
    pool: Mutex<Option<SqlitePool>>,
}

impl DbManager {
    /// Create a manager for `db_path`. No connection is opened yet.
    pub fn new<P: AsRef<Path>>(db_path: P, pool_size: u32) -> Self {
        Self { path: db_path.as_ref().to_path_buf(), pool_size: pool_size.max(1), pool: Mutex::new(None) }
    }

    /// Return the configured database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a pool has been created.
    pub fn is_open(&self) -> bool {
        self.pool.lock().is_some()
    }

    /// Borrow the pool, creating it (and the storage file) on first use.
    pub fn pool(&self) -> Result<SqlitePool> {
        let mut slot = self.pool.lock();
        if let Some(pool) = slot.as_ref() {
            return Ok(pool.clone());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(to_domain)?;
        }

        let manager = SqliteConnectionManager::file(&self.path).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
        });
        let pool = Pool::builder().max_size(self.pool_size).build(manager).map_err(to_domain)?;

        info!(
            db_path = %self.path.display(),
            max_connections = self.pool_size,
            "database.pool_initialised"
        );

        *slot = Some(pool.clone());
        Ok(pool)
    }

    /// Acquire a connection from the pool.
    pub fn get_connection(&self) -> Result<SqliteConnection> {
        self.pool()?.get().map_err(to_domain)
    }

    /// Ensure the full schema exists on the current database.
    pub fn run_migrations(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.execute_batch(SCHEMA_SQL).map_err(to_domain)?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?, CAST(strftime('%s','now') AS INTEGER))",
            params![SCHEMA_VERSION],
        )
        .map_err(to_domain)?;
        Ok(())
    }

    /// Drop the pool so the storage file can be replaced on disk.
    pub fn close(&self) {
        if self.pool.lock().take().is_some() {
            info!(db_path = %self.path.display(), "database.pool_closed");
        }
    }

    /// Perform a health check to verify database connectivity.
    pub fn health_check(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0)).map_err(to_domain)?;
        Ok(())
    }
}
