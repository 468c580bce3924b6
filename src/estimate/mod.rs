//! Approximate row counts.
//!
//! - [`plan`] - reads the planner's `rows=N` estimate out of `EXPLAIN` text
//! - [`rounding`] - one-significant-digit rounding of estimates
//! - [`estimator`] - picks plan probe or exact `COUNT(*)` per dialect and
//!   runs it through a [`QueryExecutor`](crate::exec::QueryExecutor)

mod error;
pub mod estimator;
pub mod plan;
pub mod rounding;

pub use error::{EstimateError, EstimateResult};
pub use estimator::{EstimateOptions, Estimator, Probe, Strategy};
pub use plan::{parse_plan_line, parse_plan_rows};
pub use rounding::round_count;
