//! # Liftoff Domain
//!
//! Domain types shared by every Liftoff crate.
//!
//! This crate contains:
//! - Value types passed across ports (versions, backups, scheduled jobs)
//! - Domain error type and Result definition
//! - Configuration structures
//! - Constants (preference keys, thresholds, default intervals)
//!
//! ## Architecture
//! - No dependencies on other Liftoff crates
//! - Only external dependencies allowed
//! - Pure data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
