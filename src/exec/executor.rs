//! QueryExecutor trait definition.

use async_trait::async_trait;
use thiserror::Error;

use crate::sql::expr::Literal;
use crate::worker::WorkerError;

/// Result type for statement execution.
pub type ExecResult<T> = Result<T, ExecError>;

/// Errors raised while executing a statement.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The worker failed to run the statement.
    #[error(transparent)]
    Worker(#[from] WorkerError),

    /// A scalar query returned no rows.
    #[error("query returned no rows")]
    NoRows,

    /// A scalar query returned something other than an integer.
    #[error("unexpected value: {0}")]
    UnexpectedValue(String),

    /// Failure reported by a non-worker executor.
    #[error("{0}")]
    Backend(String),
}

/// Executes rendered SQL against a database.
///
/// `args` are bound positionally, in the order the statement's placeholders
/// appear.
///
/// # Example
///
/// ```ignore
/// use approxcount::exec::QueryExecutor;
///
/// async fn plan(exec: &dyn QueryExecutor) -> ExecResult<Vec<String>> {
///     exec.execute_row_query("EXPLAIN SELECT 1 FROM audit", &[]).await
/// }
/// ```
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run a statement that yields exactly one integer.
    async fn execute_scalar_query(&self, sql: &str, args: &[Literal]) -> ExecResult<i64>;

    /// Run a statement and return the first column of every row as text,
    /// in result order. An empty result is not an error.
    async fn execute_row_query(&self, sql: &str, args: &[Literal]) -> ExecResult<Vec<String>>;
}
