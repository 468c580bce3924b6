//! Statement execution.
//!
//! The estimator only ever needs two shapes of result: a single integer
//! (`COUNT(*)`) or the first column of every row as text (`EXPLAIN`).
//! [`QueryExecutor`] is that seam; [`WorkerExecutor`] implements it over the
//! database worker.

mod executor;
mod worker_executor;

pub use executor::{ExecError, ExecResult, QueryExecutor};
pub use worker_executor::{first_column_text, scalar_from_rows, WorkerExecutor};
