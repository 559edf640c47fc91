//! Port interfaces for persisted preferences
//!
//! The version record and the startup flags live outside the storage
//! engine, so they survive the storage file going missing.

use std::collections::BTreeMap;

use async_trait::async_trait;
use liftoff_domain::{PreferenceValue, Result};

/// Holder of the last recorded application version.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Version recorded by the last successful startup, 0 if never set.
    async fn current_version(&self) -> Result<u32>;

    /// Record the installed version.
    async fn set_current_version(&self, version: u32) -> Result<()>;
}

/// Key-value preference store.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Read a raw value.
    async fn get(&self, key: &str) -> Result<Option<PreferenceValue>>;

    /// Write a raw value, replacing any previous one.
    async fn set(&self, key: &str, value: PreferenceValue) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Fill every absent key from `defaults`; existing keys are never
    /// overwritten. Returns the number of keys written.
    async fn apply_defaults(&self, defaults: &BTreeMap<String, PreferenceValue>) -> Result<usize>;

    /// Read a boolean, falling back to `default` when absent or mistyped.
    async fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        Ok(self.get(key).await?.and_then(|value| value.as_bool()).unwrap_or(default))
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set(key, PreferenceValue::Bool(value)).await
    }

    async fn get_int(&self, key: &str) -> Result<Option<i64>> {
        Ok(self.get(key).await?.and_then(|value| value.as_int()))
    }

    async fn set_int(&self, key: &str, value: i64) -> Result<()> {
        self.set(key, PreferenceValue::Int(value)).await
    }
}
