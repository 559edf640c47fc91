//! Version upgrades and every-startup normalization

pub mod ports;
pub mod runner;

pub use runner::{MigrationStep, UpgradeRunner};
