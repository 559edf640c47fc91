//! Value types passed across the startup ports

pub mod backup;
pub mod environment;
pub mod preferences;
pub mod scheduling;
pub mod version;

pub use backup::{BackupArtifact, RestoreOutcome};
pub use environment::{AppEnvironment, InstalledApplication, PromptResponse};
pub use preferences::PreferenceValue;
pub use scheduling::{JobKind, Trigger};
pub use version::VersionRecord;
