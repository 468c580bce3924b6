//! Errors raised while running a statement through the worker process.

use std::io;
use thiserror::Error;

use crate::config::SettingsError;

/// Result type for worker operations.
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Failures of the `query.execute` round trip, from locating the worker
/// binary to the database rejecting the statement.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// No worker binary could be located from the settings.
    #[error("cannot locate worker: {0}")]
    NotConfigured(#[source] SettingsError),

    /// Failed to spawn the worker process.
    #[error("failed to spawn worker process: {0}")]
    SpawnFailed(#[source] io::Error),

    /// The child started without piped stdin/stdout.
    #[error("worker process started without piped stdio")]
    StdioUnavailable,

    /// Failed to write a request line to worker stdin.
    #[error("failed to write to worker: {0}")]
    WriteFailed(#[source] io::Error),

    #[error("failed to serialize request: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    /// The result payload did not match `ExecuteQueryResponse`.
    #[error("failed to deserialize response: {0}")]
    DeserializeFailed(#[source] serde_json::Error),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// The worker closed stdout before answering.
    #[error("worker process exited unexpectedly")]
    WorkerExited,

    #[error("database driver not found: {0}")]
    DriverNotFound(String),

    #[error("database connection failed: {0}")]
    ConnectionFailed(String),

    /// The database rejected or failed the statement.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Any other error code reported by the worker.
    #[error("worker error: {message} (code: {code})")]
    Remote { code: String, message: String },
}

impl From<SettingsError> for WorkerError {
    fn from(err: SettingsError) -> Self {
        Self::NotConfigured(err)
    }
}
