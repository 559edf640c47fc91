//! Conversions from external infrastructure errors into domain errors.

use std::io::{Error as IoError, ErrorKind};

use liftoff_domain::LiftoffError;
use r2d2::Error as PoolError;
use rusqlite::Error as SqlError;
use serde_json::Error as JsonError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub LiftoffError);

impl From<InfraError> for LiftoffError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<LiftoffError> for InfraError {
    fn from(value: LiftoffError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoLiftoffError {
    fn into_liftoff(self) -> LiftoffError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → LiftoffError */
/* -------------------------------------------------------------------------- */

impl IntoLiftoffError for SqlError {
    fn into_liftoff(self) -> LiftoffError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => LiftoffError::Storage("database is busy".into()),
                    ErrorCode::DatabaseLocked => LiftoffError::Storage("database is locked".into()),
                    ErrorCode::NotADatabase => {
                        LiftoffError::Storage(format!("file is not a database: {message}"))
                    }
                    ErrorCode::DatabaseCorrupt => {
                        LiftoffError::Storage(format!("database image is malformed: {message}"))
                    }
                    ErrorCode::CannotOpen => {
                        LiftoffError::Storage(format!("unable to open database file: {message}"))
                    }
                    _ => LiftoffError::Storage(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => LiftoffError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                LiftoffError::Storage(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                LiftoffError::Storage(format!("invalid column type for {name}: {ty}"))
            }
            RE::InvalidPath(path) => LiftoffError::Storage(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => LiftoffError::Storage(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_liftoff())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → LiftoffError */
/* -------------------------------------------------------------------------- */

impl IntoLiftoffError for PoolError {
    fn into_liftoff(self) -> LiftoffError {
        LiftoffError::Storage(format!("connection pool unavailable: {self}"))
    }
}

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        InfraError(value.into_liftoff())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → LiftoffError */
/* -------------------------------------------------------------------------- */

impl IntoLiftoffError for IoError {
    fn into_liftoff(self) -> LiftoffError {
        match self.kind() {
            ErrorKind::NotFound => LiftoffError::NotFound(self.to_string()),
            ErrorKind::PermissionDenied => {
                LiftoffError::Platform(format!("permission denied: {self}"))
            }
            _ => LiftoffError::Platform(format!("i/o failure: {self}")),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_liftoff())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → LiftoffError */
/* -------------------------------------------------------------------------- */

impl IntoLiftoffError for JsonError {
    fn into_liftoff(self) -> LiftoffError {
        if self.is_io() {
            return LiftoffError::Platform(format!("i/o failure while encoding json: {self}"));
        }
        LiftoffError::InvalidInput(format!(
            "malformed json at line {} column {}: {self}",
            self.line(),
            self.column()
        ))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_liftoff())
    }
}

/* -------------------------------------------------------------------------- */
/* tokio::task::JoinError → LiftoffError */
/* -------------------------------------------------------------------------- */

impl From<tokio::task::JoinError> for InfraError {
    fn from(value: tokio::task::JoinError) -> Self {
        let message = if value.is_panic() {
            "blocking task panicked".to_string()
        } else {
            format!("blocking task cancelled: {value}")
        };
        InfraError(LiftoffError::Internal(message))
    }
}

/// Shorthand used by adapters: map any convertible error straight into the
/// domain error.
pub(crate) fn to_domain<E>(err: E) -> LiftoffError
where
    InfraError: From<E>,
{
    LiftoffError::from(InfraError::from(err))
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
