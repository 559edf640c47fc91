//! Error reporting and analytics ports.
//!
//! Both are fire-and-forget: implementations must never fail or block for
//! long, because they are called from failure paths (including the panic
//! hook).

/// Sink for non-fatal errors caught during startup.
pub trait ErrorReporter: Send + Sync {
    /// Report an error under a stable tag (e.g. `"startup-package-read"`).
    fn report_error(&self, tag: &str, error: &(dyn std::error::Error + 'static));
}

/// Sink for analytics events.
pub trait AnalyticsPort: Send + Sync {
    /// Record a named event.
    fn record_event(&self, name: &str);
}
