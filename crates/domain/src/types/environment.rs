//! Runtime environment handed to the orchestrator

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The application context a startup runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEnvironment {
    pub package_id: String,
    pub data_dir: PathBuf,
    pub backup_dir: PathBuf,
    /// OEM-controlled build; advisory prompts are suppressed.
    pub restricted_build: bool,
}

impl AppEnvironment {
    /// Resolve a storage file name inside the data directory.
    pub fn storage_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }
}

/// Another application visible to the environment inspector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledApplication {
    pub package_name: String,
    pub label: String,
    /// `None` when permissions were not requested or are unavailable.
    pub requested_permissions: Option<Vec<String>>,
}

impl InstalledApplication {
    pub fn requests(&self, permission: &str) -> bool {
        self.requested_permissions
            .as_deref()
            .is_some_and(|permissions| permissions.iter().any(|p| p == permission))
    }
}

/// How the user answered an informational prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptResponse {
    Acknowledged,
    Ignored,
}
