//! Backup artifacts and restore outcomes

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A backup file discovered in the backup directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupArtifact {
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
}

impl BackupArtifact {
    pub fn new(path: impl Into<PathBuf>, modified: DateTime<Utc>) -> Self {
        Self { path: path.into(), modified }
    }

    /// Most recently modified artifact, if any.
    pub fn newest(artifacts: &[BackupArtifact]) -> Option<&BackupArtifact> {
        artifacts.iter().max_by_key(|artifact| artifact.modified)
    }

    /// Sort newest first.
    pub fn sort_newest_first(artifacts: &mut [BackupArtifact]) {
        artifacts.sort_by(|a, b| b.modified.cmp(&a.modified));
    }
}

/// What the recovery inspector did during a startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RestoreOutcome {
    /// Storage present or the application never ran before.
    NotNeeded,
    /// Storage missing but nothing to restore from.
    NoBackups,
    /// Storage rebuilt from the given artifact.
    Restored { path: PathBuf },
    /// Restore was attempted and failed; the user starts with empty data.
    Failed { reason: String },
}
