//! Background job scheduling

pub mod ports;
pub mod scheduler;

pub use scheduler::BackgroundScheduler;
