//! Tracing subscriber setup

use liftoff_domain::{LiftoffError, LoggingConfig, Result};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `logging.filter`. Fails if a subscriber is already
/// installed or the filter does not parse.
pub fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.filter).map_err(|e| {
            LiftoffError::Config(format!("invalid log filter {:?}: {e}", logging.filter))
        })?,
    };

    let installed = if logging.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init()
    };
    installed.map_err(|e| LiftoffError::Internal(format!("failed to install subscriber: {e}")))
}
