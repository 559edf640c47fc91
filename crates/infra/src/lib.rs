//! # Liftoff Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite storage, schema and built-in migrations (`r2d2` pooled)
//! - JSON preference store holding the recorded application version
//! - Backup catalog, importer and periodic snapshot job
//! - Timer service and persisted alarm schedules (`tokio-cron-scheduler`)
//! - Platform adapters (package manifest, running-process catalog)
//! - Configuration loading and the single-instance lock
//!
//! ## Architecture
//! - Implements traits defined in `liftoff-core`
//! - Depends on `liftoff-domain` and `liftoff-core`
//! - Contains all "impure" code (I/O, platform APIs)

pub mod backup;
pub mod config;
pub mod database;
pub mod errors;
pub mod instance_lock;
pub mod normalization;
pub mod observability;
pub mod platform;
pub mod preferences;
pub mod scheduling;

// Re-export commonly used items
pub use backup::*;
pub use database::*;
pub use errors::InfraError;
pub use instance_lock::*;
pub use normalization::*;
pub use observability::*;
pub use platform::*;
pub use preferences::*;
pub use scheduling::*;
