//! Port interfaces for migration work units

use async_trait::async_trait;
use liftoff_domain::{AppEnvironment, Result};

/// A data transformation keyed to a version threshold.
///
/// A failing step may be re-run on the next startup (the version is only
/// recorded after every step succeeded), so implementations must tolerate
/// partially applied earlier attempts.
#[async_trait]
pub trait Migration: Send + Sync {
    fn name(&self) -> &str;

    async fn apply(&self) -> Result<()>;
}

/// Version-independent reconciliation that runs on every startup.
#[async_trait]
pub trait Normalization: Send + Sync {
    fn name(&self) -> &str;

    /// Must be idempotent.
    async fn apply(&self, environment: &AppEnvironment) -> Result<()>;
}
