//! SQLite storage implementations

pub mod manager;
pub mod migrations;
pub mod storage;

pub use manager::*;
pub use migrations::*;
pub use storage::*;
