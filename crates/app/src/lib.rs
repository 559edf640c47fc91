//! # Liftoff App
//!
//! Composition root and binary entry point.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Job handlers and the headless advisory prompt
//! - Logging initialization
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod context;
pub mod jobs;
pub mod utils;

pub use context::*;
