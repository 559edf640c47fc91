//! Data-loss recovery from backup snapshots

pub mod inspector;
pub mod ports;

pub use inspector::RecoveryInspector;
