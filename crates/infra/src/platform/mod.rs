//! Platform adapters
//!
//! - `ManifestPackageMetadata`: installed version code from a TOML manifest
//! - `ProcessCatalog`: running processes as seen by `sysinfo`

pub mod package_manifest;
pub mod process_catalog;

pub use package_manifest::ManifestPackageMetadata;
pub use process_catalog::ProcessCatalog;
