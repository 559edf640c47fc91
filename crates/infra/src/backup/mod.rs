//! Backup discovery, restore and snapshots

pub mod catalog;
pub mod importer;
pub mod snapshot;

pub use catalog::DirectoryBackupCatalog;
pub use importer::SqliteBackupImporter;
pub use snapshot::BackupSnapshotJob;
