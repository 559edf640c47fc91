//! Preference and version storage ports

pub mod ports;
