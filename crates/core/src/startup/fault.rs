//! Process-wide panic reporting.
//!
//! The hook reports the panic to the error reporter and then hands over to
//! whatever hook was installed before, so the default abort/unwind
//! behaviour is preserved.

use std::any::Any;
use std::panic::{self, PanicHookInfo};
use std::sync::{Arc, Once};

use thiserror::Error;
use tracing::error;

use crate::observability_ports::ErrorReporter;

static INSTALL: Once = Once::new();

/// Tag under which panics are reported.
pub const PANIC_TAG: &str = "startup-panic";

/// A panic that reached the process-wide hook.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("panic at {location}: {message}")]
pub struct UncaughtPanic {
    pub location: String,
    pub message: String,
}

impl UncaughtPanic {
    /// Build from a panic payload (`&str` and `String` payloads are kept).
    pub fn from_payload(payload: &(dyn Any + Send), location: Option<String>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };

        Self { location: location.unwrap_or_else(|| "unknown location".into()), message }
    }

    fn from_hook(info: &PanicHookInfo<'_>) -> Self {
        let location = info.location().map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
        Self::from_payload(info.payload(), location)
    }
}

/// Install the panic reporter once per process.
///
/// Returns `true` if this call installed the hook; later calls (with any
/// reporter) are no-ops.
pub fn install_panic_reporter(reporter: Arc<dyn ErrorReporter>) -> bool {
    let mut installed = false;
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let fault = UncaughtPanic::from_hook(info);
            error!(location = %fault.location, message = %fault.message, "startup.panic");
            reporter.report_error(PANIC_TAG, &fault);
            previous(info);
        }));
        installed = true;
    });
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_payloads_are_preserved() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("index out of bounds"));
        let fault = UncaughtPanic::from_payload(owned.as_ref(), Some("src/lib.rs:1:1".into()));
        assert_eq!(fault.message, "index out of bounds");
        assert_eq!(fault.to_string(), "panic at src/lib.rs:1:1: index out of bounds");

        let borrowed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(UncaughtPanic::from_payload(borrowed.as_ref(), None).message, "boom");
    }

    #[test]
    fn opaque_payloads_get_placeholder() {
        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        let fault = UncaughtPanic::from_payload(payload.as_ref(), None);
        assert_eq!(fault.message, "non-string panic payload");
        assert_eq!(fault.location, "unknown location");
    }
}
