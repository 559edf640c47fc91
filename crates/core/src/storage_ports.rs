//! Storage engine port.

use async_trait::async_trait;
use liftoff_domain::{AppEnvironment, Result};

/// The persistent storage engine as seen by the startup sequence.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    /// File name of the storage file inside the data directory.
    fn name(&self) -> &str;

    /// Whether the storage file exists for the given environment.
    fn path_exists(&self, environment: &AppEnvironment) -> bool {
        environment.storage_path(self.name()).exists()
    }

    /// Open the engine for writing, creating the file if needed.
    async fn open_for_writing(&self) -> Result<()>;

    /// Run cleanup/compaction.
    async fn cleanup(&self) -> Result<()>;
}
