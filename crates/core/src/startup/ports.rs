//! Port interfaces for environment queries made during startup

use async_trait::async_trait;
use liftoff_domain::{InstalledApplication, PromptResponse, Result};

/// Reads the installed package's metadata.
#[async_trait]
pub trait PackageMetadata: Send + Sync {
    /// Version code of `package_id`; fails if the package is unknown or its
    /// metadata is malformed.
    async fn version_code(&self, package_id: &str) -> Result<u32>;
}

/// Read-only listing of other applications in the environment.
#[async_trait]
pub trait ApplicationCatalog: Send + Sync {
    /// When `with_permissions` is false, `requested_permissions` may be
    /// left empty.
    async fn installed_applications(
        &self,
        with_permissions: bool,
    ) -> Result<Vec<InstalledApplication>>;
}

/// Presents informational prompts to the user.
#[async_trait]
pub trait AdvisoryPrompt: Send + Sync {
    /// Explain that `app_label` may terminate this application's background
    /// work.
    async fn show_task_killer_notice(&self, app_label: &str) -> Result<PromptResponse>;
}
