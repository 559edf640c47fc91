//! `tracing`-backed error reporter and analytics sink

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use liftoff_core::{AnalyticsPort, ErrorReporter};
use parking_lot::Mutex;

/// Logs each report at `error` level with the full source chain.
#[derive(Debug, Default)]
pub struct TracingErrorReporter {
    reported: AtomicUsize,
}

impl TracingErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of errors reported so far.
    pub fn reported(&self) -> usize {
        self.reported.load(Ordering::Acquire)
    }
}

impl ErrorReporter for TracingErrorReporter {
    fn report_error(&self, tag: &str, error: &(dyn std::error::Error + 'static)) {
        self.reported.fetch_add(1, Ordering::AcqRel);
        let chain = source_chain(error);
        tracing::error!(tag, error = %error, causes = %chain, "error_reporter.reported");
    }
}

/// Walk `source()` links, joined with `": "`.
fn source_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut causes = Vec::new();
    let mut current = error.source();
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    causes.join(": ")
}

/// Logs analytics events and keeps per-event counts.
#[derive(Debug, Default)]
pub struct TracingAnalytics {
    counts: Mutex<BTreeMap<String, usize>>,
}

impl TracingAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, name: &str) -> usize {
        self.counts.lock().get(name).copied().unwrap_or(0)
    }

    /// Snapshot of every event recorded so far.
    pub fn snapshot(&self) -> BTreeMap<String, usize> {
        self.counts.lock().clone()
    }
}

impl AnalyticsPort for TracingAnalytics {
    fn record_event(&self, name: &str) {
        let total = {
            let mut counts = self.counts.lock();
            let entry = counts.entry(name.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };
        tracing::info!(event = name, total, "analytics.event");
    }
}
