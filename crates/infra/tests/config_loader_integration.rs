//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::path::PathBuf;

use liftoff_domain::constants::STABLE_STORAGE_VERSION;
use liftoff_domain::{LiftoffError, PreferenceValue};
use liftoff_infra::config;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write config file");
    path
}

#[test]
fn test_load_config_from_json_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        &dir,
        "liftoff.json",
        r#"{
            "startup": { "package_id": "org.example.todo", "restricted_build": true },
            "storage": { "data_dir": "/var/lib/todo", "database_name": "todo.db", "pool_size": 2 },
            "sync": { "enabled": false, "interval_seconds": 900 },
            "preferences": { "defaults": { "nightly_reminders": false } }
        }"#,
    );

    let config = config::load_from_file(Some(path)).expect("json config loads");

    assert_eq!(config.startup.package_id, "org.example.todo");
    assert!(config.startup.restricted_build);
    assert_eq!(config.database_path(), PathBuf::from("/var/lib/todo/todo.db"));
    assert_eq!(config.storage.pool_size, 2);
    assert!(!config.sync.enabled);
    assert_eq!(config.sync.interval_seconds, 900);
    assert_eq!(
        config.preferences.defaults.get("nightly_reminders"),
        Some(&PreferenceValue::Bool(false))
    );
    // A provided map replaces the built-in defaults entirely.
    assert_eq!(config.preferences.defaults.len(), 1);
}

#[test]
fn test_load_config_from_toml_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        &dir,
        "liftoff.toml",
        r#"
[startup]
package_id = "org.example.todo"
stable_storage_version = 120

[backup]
enabled = false
retention = 3

[widget]
refresh_interval_seconds = 60
"#,
    );

    let config = config::load_from_file(Some(path)).expect("toml config loads");

    assert_eq!(config.startup.stable_storage_version, 120);
    assert!(!config.backup.enabled);
    assert_eq!(config.backup.retention, 3);
    assert_eq!(config.widget.refresh_interval().as_secs(), 60);
}

#[test]
fn test_load_config_with_minimal_fields() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(&dir, "liftoff.json", "{}");

    let config = config::load_from_file(Some(path)).expect("empty object is valid");

    assert_eq!(config, liftoff_domain::Config::default());
    assert_eq!(config.startup.stable_storage_version, STABLE_STORAGE_VERSION);
}

#[test]
fn test_load_config_rejects_bad_input() {
    let dir = TempDir::new().expect("temp dir");

    let missing = config::load_from_file(Some(dir.path().join("absent.json")));
    assert!(matches!(missing, Err(LiftoffError::Config(_))));

    let invalid = write(&dir, "broken.toml", "[startup\npackage_id = ");
    assert!(matches!(config::load_from_file(Some(invalid)), Err(LiftoffError::Config(_))));

    let unsupported = write(&dir, "liftoff.yaml", "startup: {}");
    assert!(matches!(config::load_from_file(Some(unsupported)), Err(LiftoffError::Config(_))));
}
