//! Scheduler error types

use std::time::Duration;

use liftoff_domain::LiftoffError;
use thiserror::Error;
use tokio::time::error::Elapsed;
use tokio_cron_scheduler::JobSchedulerError;

use crate::errors::InfraError;

/// Scheduler-specific errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Scheduler is already running
    #[error("Scheduler already running")]
    AlreadyRunning,

    /// Scheduler is not running
    #[error("Scheduler not running")]
    NotRunning,

    /// Failed to create scheduler
    #[error("Failed to create scheduler: {source}")]
    CreationFailed {
        #[source]
        source: JobSchedulerError,
    },

    /// Failed to start scheduler
    #[error("Failed to start scheduler: {source}")]
    StartFailed {
        #[source]
        source: JobSchedulerError,
    },

    /// Failed to stop scheduler
    #[error("Failed to stop scheduler: {source}")]
    StopFailed {
        #[source]
        source: JobSchedulerError,
    },

    /// Failed to register job
    #[error("Failed to register job {key}: {source}")]
    JobRegistrationFailed {
        key: String,
        #[source]
        source: JobSchedulerError,
    },

    /// Failed to remove a replaced or cancelled job
    #[error("Failed to remove job {key}: {source}")]
    JobRemovalFailed {
        key: String,
        #[source]
        source: JobSchedulerError,
    },

    /// Operation timed out
    #[error("Operation timed out after {duration:?}")]
    Timeout {
        duration: Duration,
        #[source]
        source: Elapsed,
    },
}

impl From<SchedulerError> for InfraError {
    fn from(err: SchedulerError) -> Self {
        let liftoff_err = match err {
            SchedulerError::AlreadyRunning | SchedulerError::NotRunning => {
                LiftoffError::InvalidInput(err.to_string())
            }
            _ => LiftoffError::Scheduling(err.to_string()),
        };
        InfraError(liftoff_err)
    }
}

impl From<SchedulerError> for LiftoffError {
    fn from(err: SchedulerError) -> Self {
        InfraError::from(err).into()
    }
}

/// Convenience type alias for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;
