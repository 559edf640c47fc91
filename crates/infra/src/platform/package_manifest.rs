//! Package manifest reader
//!
//! The manifest is a small TOML file shipped next to the binary:
//!
//! ```toml
//! [package]
//! id = "com.liftoff.tasks"
//! version_code = 140
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use liftoff_core::PackageMetadata;
use liftoff_domain::{LiftoffError, Result};
use serde::Deserialize;

use crate::errors::conversions::to_domain;

#[derive(Debug, Deserialize)]
struct Manifest {
    package: PackageSection,
}

#[derive(Debug, Deserialize)]
struct PackageSection {
    id: String,
    version_code: u32,
}

pub struct ManifestPackageMetadata {
    path: PathBuf,
}

impl ManifestPackageMetadata {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PackageMetadata for ManifestPackageMetadata {
    async fn version_code(&self, package_id: &str) -> Result<u32> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(to_domain)?;
        let manifest: Manifest = toml::from_str(&contents).map_err(|e| {
            LiftoffError::InvalidInput(format!(
                "malformed package manifest {}: {e}",
                self.path.display()
            ))
        })?;

        if manifest.package.id != package_id {
            return Err(LiftoffError::NotFound(format!(
                "package {package_id} not described by {} (found {})",
                self.path.display(),
                manifest.package.id
            )));
        }
        Ok(manifest.package.version_code)
    }
}
