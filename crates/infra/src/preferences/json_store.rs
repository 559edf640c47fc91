//! JSON-file preference store
//!
//! Preferences (including the recorded application version) live in a small
//! JSON object next to the storage file. Every write replaces the file
//! atomically through a temporary sibling and a rename.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use liftoff_core::{PreferenceStore, VersionStore};
use liftoff_domain::constants::{PREF_CURRENT_VERSION, UNKNOWN_VERSION};
use liftoff_domain::{LiftoffError, PreferenceValue, Result};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::errors::conversions::to_domain;

type PreferenceMap = BTreeMap<String, PreferenceValue>;

pub struct JsonPreferenceStore {
    path: PathBuf,
    values: Mutex<PreferenceMap>,
}

impl JsonPreferenceStore {
    /// Load the store from `path`.
    ///
    /// A missing file yields an empty store. An unreadable or malformed file
    /// is moved aside to `<path>.corrupt` and the store starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<PreferenceMap>(&contents) {
                Ok(values) => values,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "preferences.corrupt_file");
                    quarantine(&path)?;
                    PreferenceMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => PreferenceMap::new(),
            Err(err) => return Err(to_domain(err)),
        };

        debug!(path = %path.display(), keys = values.len(), "preferences.loaded");
        Ok(Self { path, values: Mutex::new(values) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, values: &PreferenceMap) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(to_domain)?;
        }
        let encoded = serde_json::to_vec_pretty(values).map_err(to_domain)?;
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, encoded).await.map_err(to_domain)?;
        tokio::fs::rename(&staging, &self.path).await.map_err(to_domain)
    }
}

fn quarantine(path: &Path) -> Result<()> {
    let mut aside = path.as_os_str().to_owned();
    aside.push(".corrupt");
    std::fs::rename(path, PathBuf::from(aside)).map_err(to_domain)
}

#[async_trait]
impl PreferenceStore for JsonPreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<PreferenceValue>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: PreferenceValue) -> Result<()> {
        let mut values = self.values.lock().await;
        let mut next = values.clone();
        next.insert(key.to_string(), value);
        self.persist(&next).await?;
        *values = next;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().await;
        if !values.contains_key(key) {
            return Ok(());
        }
        let mut next = values.clone();
        next.remove(key);
        self.persist(&next).await?;
        *values = next;
        Ok(())
    }

    async fn apply_defaults(&self, defaults: &BTreeMap<String, PreferenceValue>) -> Result<usize> {
        let mut values = self.values.lock().await;
        let mut next = values.clone();
        let mut written = 0;
        for (key, value) in defaults {
            if !next.contains_key(key) {
                next.insert(key.clone(), value.clone());
                written += 1;
            }
        }
        if written > 0 {
            self.persist(&next).await?;
            *values = next;
        }
        Ok(written)
    }
}

#[async_trait]
impl VersionStore for JsonPreferenceStore {
    async fn current_version(&self) -> Result<u32> {
        match self.get_int(PREF_CURRENT_VERSION).await? {
            None => Ok(UNKNOWN_VERSION),
            Some(raw) => u32::try_from(raw).map_err(|_| {
                LiftoffError::InvalidInput(format!("recorded version out of range: {raw}"))
            }),
        }
    }

    async fn set_current_version(&self, version: u32) -> Result<()> {
        self.set_int(PREF_CURRENT_VERSION, i64::from(version)).await
    }
}
