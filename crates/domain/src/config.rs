//! Configuration structures
//!
//! Every section derives `Default` and is `#[serde(default)]`, so partial
//! JSON/TOML files only need to name the values they override.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BACKUP_INTERVAL_SECS, DEFAULT_BACKUP_RETENTION, DEFAULT_SYNC_INTERVAL_SECS,
    PREF_DEFAULT_IMPORTANCE, PREF_DEFAULT_REMINDER_MINUTES, PREF_DEFAULT_URGENCY,
    PREF_NIGHTLY_REMINDERS, PREF_SYNC_INTERVAL, STABLE_STORAGE_VERSION, WIDGET_UPDATE_INTERVAL,
};
use crate::types::{AppEnvironment, PreferenceValue};

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub startup: StartupConfig,
    pub storage: StorageConfig,
    pub backup: BackupConfig,
    pub sync: SyncConfig,
    pub widget: WidgetConfig,
    pub preferences: PreferencesConfig,
    pub advisory: AdvisoryConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Build the environment handed to the startup orchestrator.
    pub fn environment(&self) -> AppEnvironment {
        AppEnvironment {
            package_id: self.startup.package_id.clone(),
            data_dir: self.storage.data_dir.clone(),
            backup_dir: self.backup.directory.clone(),
            restricted_build: self.startup.restricted_build,
        }
    }

    /// Full path of the storage file.
    pub fn database_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.database_name)
    }
}

/// Startup orchestration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupConfig {
    /// Identifier looked up in the package manifest.
    pub package_id: String,
    /// Manifest file carrying the installed version code.
    pub manifest_path: PathBuf,
    /// Restricted (OEM-controlled) builds skip the advisory scan.
    pub restricted_build: bool,
    /// Recorded versions above this value imply a storage file existed.
    pub stable_storage_version: u32,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            package_id: "com.liftoff.tasks".into(),
            manifest_path: PathBuf::from("package.toml"),
            restricted_build: false,
            stable_storage_version: STABLE_STORAGE_VERSION,
        }
    }
}

/// Storage engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub database_name: String,
    pub pool_size: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("data"), database_name: "tasks.db".into(), pool_size: 4 }
    }
}

/// Backup snapshot settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub enabled: bool,
    pub directory: PathBuf,
    pub snapshot_interval_seconds: u64,
    /// Number of snapshots kept after pruning.
    pub retention: usize,
}

impl BackupConfig {
    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_secs(self.snapshot_interval_seconds.max(1))
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("data/backups"),
            snapshot_interval_seconds: DEFAULT_BACKUP_INTERVAL_SECS,
            retention: DEFAULT_BACKUP_RETENTION,
        }
    }
}

/// Remote sync settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds.max(1))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { enabled: true, interval_seconds: DEFAULT_SYNC_INTERVAL_SECS }
    }
}

/// Home-screen widget refresh settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub refresh_interval_seconds: u64,
}

impl WidgetConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds.max(1))
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self { refresh_interval_seconds: WIDGET_UPDATE_INTERVAL.as_secs() }
    }
}

/// Preference store settings and the defaults applied at every startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesConfig {
    pub path: PathBuf,
    pub defaults: BTreeMap<String, PreferenceValue>,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        let defaults = BTreeMap::from([
            (PREF_DEFAULT_URGENCY.to_string(), PreferenceValue::Int(0)),
            (PREF_DEFAULT_IMPORTANCE.to_string(), PreferenceValue::Int(2)),
            (PREF_DEFAULT_REMINDER_MINUTES.to_string(), PreferenceValue::Int(0)),
            (PREF_NIGHTLY_REMINDERS.to_string(), PreferenceValue::Bool(true)),
            (
                PREF_SYNC_INTERVAL.to_string(),
                PreferenceValue::Int(DEFAULT_SYNC_INTERVAL_SECS as i64),
            ),
        ]);
        Self { path: PathBuf::from("data/preferences.json"), defaults }
    }
}

/// Advisory scan settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// Process names recognised as task-terminating utilities.
    pub task_killer_names: Vec<String>,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            task_killer_names: vec![
                "taskkiller".into(),
                "advanced-task-killer".into(),
                "autokiller".into(),
            ],
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info,liftoff=debug".into(), json: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config: Config = toml::from_str(
            r#"
[startup]
package_id = "org.example.todo"

[sync]
enabled = false
"#,
        )
        .expect("valid toml");

        assert_eq!(config.startup.package_id, "org.example.todo");
        assert_eq!(config.startup.stable_storage_version, STABLE_STORAGE_VERSION);
        assert!(!config.sync.enabled);
        assert_eq!(config.sync.interval_seconds, DEFAULT_SYNC_INTERVAL_SECS);
        assert_eq!(config.storage.database_name, "tasks.db");
    }

    #[test]
    fn environment_mirrors_storage_and_backup_sections() {
        let config = Config::default();
        let env = config.environment();

        assert_eq!(env.data_dir, config.storage.data_dir);
        assert_eq!(env.backup_dir, config.backup.directory);
        assert_eq!(env.storage_path(&config.storage.database_name), config.database_path());
    }

    #[test]
    fn zero_intervals_are_clamped_to_one_second() {
        let sync = SyncConfig { enabled: true, interval_seconds: 0 };
        assert_eq!(sync.interval(), Duration::from_secs(1));
    }
}
