//! Port interfaces for backup discovery and import

use std::path::Path;

use async_trait::async_trait;
use liftoff_domain::{AppEnvironment, BackupArtifact, Result};

/// Lists backup artifacts in a directory.
#[async_trait]
pub trait BackupCatalog: Send + Sync {
    /// All artifacts in `directory`, in no particular order.
    ///
    /// A missing directory yields an empty list, not an error.
    async fn list(&self, directory: &Path) -> Result<Vec<BackupArtifact>>;
}

/// Imports a backup artifact into the storage engine.
#[async_trait]
pub trait BackupImporter: Send + Sync {
    /// Full restore of `artifact`; nothing is merged with existing data.
    async fn import(&self, environment: &AppEnvironment, artifact: &Path) -> Result<()>;
}
