//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required ones are missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! Required:
//! - `LIFTOFF_DATA_DIR`: Directory holding the storage file and preferences
//! - `LIFTOFF_PACKAGE_ID`: Package identifier looked up in the manifest
//!
//! Optional (defaults from [`Config::default`] otherwise):
//! - `LIFTOFF_MANIFEST_PATH`: Package manifest file
//! - `LIFTOFF_RESTRICTED_BUILD`: Suppress advisory prompts (true/false)
//! - `LIFTOFF_DB_NAME`: Storage file name
//! - `LIFTOFF_DB_POOL_SIZE`: Connection pool size
//! - `LIFTOFF_BACKUP_DIR`: Backup directory (default `<data_dir>/backups`)
//! - `LIFTOFF_BACKUP_ENABLED`: Whether snapshots are scheduled (true/false)
//! - `LIFTOFF_BACKUP_INTERVAL`: Snapshot interval in seconds
//! - `LIFTOFF_BACKUP_RETENTION`: Snapshots kept after pruning
//! - `LIFTOFF_SYNC_ENABLED`: Whether remote sync is scheduled (true/false)
//! - `LIFTOFF_SYNC_INTERVAL`: Sync interval in seconds
//! - `LIFTOFF_WIDGET_REFRESH_INTERVAL`: Widget refresh interval in seconds
//! - `LIFTOFF_PREFERENCES_PATH`: Preference file (default
//!   `<data_dir>/preferences.json`)
//! - `LIFTOFF_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./liftoff.json` or `./liftoff.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use liftoff_domain::{Config, LiftoffError, Result};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `LiftoffError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("config.loaded_from_env");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "config.env_incomplete");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `LiftoffError::Config` if required variables are missing
/// or any variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let data_dir = PathBuf::from(env_var("LIFTOFF_DATA_DIR")?);
    let package_id = env_var("LIFTOFF_PACKAGE_ID")?;

    let mut config = Config::default();

    config.startup.package_id = package_id;
    if let Some(path) = env_opt("LIFTOFF_MANIFEST_PATH") {
        config.startup.manifest_path = PathBuf::from(path);
    }
    config.startup.restricted_build = env_bool("LIFTOFF_RESTRICTED_BUILD", false);

    config.storage.data_dir = data_dir.clone();
    if let Some(name) = env_opt("LIFTOFF_DB_NAME") {
        config.storage.database_name = name;
    }
    if let Some(size) = env_parse::<u32>("LIFTOFF_DB_POOL_SIZE", "pool size")? {
        config.storage.pool_size = size;
    }

    config.backup.directory = env_opt("LIFTOFF_BACKUP_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir.join("backups"));
    config.backup.enabled = env_bool("LIFTOFF_BACKUP_ENABLED", config.backup.enabled);
    if let Some(secs) = env_parse::<u64>("LIFTOFF_BACKUP_INTERVAL", "backup interval")? {
        config.backup.snapshot_interval_seconds = secs;
    }
    if let Some(retention) = env_parse::<usize>("LIFTOFF_BACKUP_RETENTION", "backup retention")? {
        config.backup.retention = retention;
    }

    config.sync.enabled = env_bool("LIFTOFF_SYNC_ENABLED", config.sync.enabled);
    if let Some(secs) = env_parse::<u64>("LIFTOFF_SYNC_INTERVAL", "sync interval")? {
        config.sync.interval_seconds = secs;
    }

    if let Some(secs) = env_parse::<u64>("LIFTOFF_WIDGET_REFRESH_INTERVAL", "widget interval")? {
        config.widget.refresh_interval_seconds = secs;
    }

    config.preferences.path = env_opt("LIFTOFF_PREFERENCES_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir.join("preferences.json"));

    config.logging.json = env_bool("LIFTOFF_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `LiftoffError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(LiftoffError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            LiftoffError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "config.loading_file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| LiftoffError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| LiftoffError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| LiftoffError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(LiftoffError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
        candidates.extend([cwd.join("../config.json"), cwd.join("../config.toml")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> [PathBuf; 4] {
    [
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("liftoff.json"),
        dir.join("liftoff.toml"),
    ]
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        LiftoffError::Config(format!("Missing required environment variable: {}", key))
    })
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional numeric environment variable.
fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| LiftoffError::Config(format!("Invalid {what} in {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
