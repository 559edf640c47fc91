//! # Liftoff Core
//!
//! Startup orchestration logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for every collaborator the startup touches
//! - The recovery inspector, upgrade runner and background scheduler
//! - The startup orchestrator that sequences them
//!
//! ## Architecture Principles
//! - Only depends on `liftoff-domain`
//! - No database, filesystem writes or platform code
//! - All external dependencies via traits
//! - Every collaborator failure is reported, never propagated past its step

pub mod preferences;
pub mod recovery;
pub mod scheduling;
pub mod startup;
pub mod upgrade;

// Infrastructure ports
pub mod observability_ports;
pub mod storage_ports;

// Re-export specific items to avoid ambiguity
pub use observability_ports::{AnalyticsPort, ErrorReporter};
pub use preferences::ports::{PreferenceStore, VersionStore};
pub use recovery::ports::{BackupCatalog, BackupImporter};
pub use recovery::RecoveryInspector;
pub use scheduling::ports::{AlarmSchedule, JobHandler, ScheduledJob, TimerService};
pub use scheduling::BackgroundScheduler;
pub use startup::ports::{AdvisoryPrompt, ApplicationCatalog, PackageMetadata};
pub use startup::{
    StartupDeps, StartupJobs, StartupOrchestrator, StartupOutcome, StartupReport, StartupSettings,
    TaskKillerAdvisor,
};
pub use storage_ports::StorageEngine;
pub use upgrade::ports::{Migration, Normalization};
pub use upgrade::{MigrationStep, UpgradeRunner};
