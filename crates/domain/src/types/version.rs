//! Version bookkeeping

use serde::{Deserialize, Serialize};

use crate::constants::UNKNOWN_VERSION;

/// Recorded vs. installed version for one startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Version persisted by the previous successful startup (0 if never set).
    pub last_recorded: u32,
    /// Version read from package metadata; 0 when it could not be read.
    pub current_installed: u32,
}

impl VersionRecord {
    pub fn new(last_recorded: u32, current_installed: u32) -> Self {
        Self { last_recorded, current_installed }
    }

    /// Whether the installed version is known.
    pub fn is_known(&self) -> bool {
        self.current_installed != UNKNOWN_VERSION
    }

    /// True when a versioned migration has to run.
    pub fn needs_migration(&self) -> bool {
        self.is_known() && self.last_recorded != self.current_installed
    }
}
