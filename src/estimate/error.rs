//! Estimation error types.

use thiserror::Error;

use crate::exec::ExecError;

/// Result type for row-count estimation.
pub type EstimateResult<T> = Result<T, EstimateError>;

/// Errors that can occur while estimating a row count.
///
/// A failure never carries a count; callers cannot read a default value
/// off an error.
#[derive(Error, Debug)]
pub enum EstimateError {
    /// The probe or COUNT query could not be executed.
    #[error("row count query failed: {0}")]
    ExecutionFailed(#[source] ExecError),

    /// The plan output contained no `rows=` estimate.
    #[error("no row estimate found in query plan")]
    NoEstimateFound,

    /// A `rows=` token was found but its value is not a non-negative integer.
    #[error("malformed row estimate '{value}' in plan line: {line}")]
    MalformedEstimate {
        /// Raw text following `rows=`.
        value: String,
        /// The plan line the token was found on.
        line: String,
    },
}

impl EstimateError {
    /// Whether the failure came from the execution layer.
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::ExecutionFailed(_))
    }

    /// Whether the failure came from reading the plan text.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::NoEstimateFound | Self::MalformedEstimate { .. })
    }
}

impl From<ExecError> for EstimateError {
    fn from(err: ExecError) -> Self {
        Self::ExecutionFailed(err)
    }
}
