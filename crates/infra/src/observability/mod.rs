//! Observability adapters
//!
//! Error reports and analytics events are emitted as structured `tracing`
//! events and counted in memory so the composition root can log a summary
//! at shutdown.

pub mod reporter;

pub use reporter::{TracingAnalytics, TracingErrorReporter};
