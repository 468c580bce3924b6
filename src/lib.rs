//! # approxcount
//!
//! Approximate row counts for SQL `SELECT` statements.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            SelectStmt (db) / Query (sql)                 │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [estimate::Estimator]
//!            supports_plan_estimate(dialect)?
//!              │ yes                       │ no
//!              ▼                           ▼
//!   EXPLAIN SELECT 1 ...           SELECT COUNT(*) ...
//!              │                           │
//!              ▼ [exec::QueryExecutor]     ▼
//!      plan text rows                scalar count
//!              │                           │
//!              ▼ [estimate::plan]          │
//!     first `rows=N` token                 │
//!              │                           │
//!              ▼ [estimate::rounding]      │
//!     one significant digit                │
//!              └─────────────┬─────────────┘
//!                            ▼
//!                     Result<u64, EstimateError>
//! ```
//!
//! The [`worker`] module runs statements through a long-lived database
//! worker process; [`exec::WorkerExecutor`] adapts it to the executor seam.

pub mod config;
pub mod db;
pub mod estimate;
pub mod exec;
pub mod sql;
pub mod worker;

// Re-export SQL submodules at crate level
pub use sql::dialect;
pub use sql::expr;
pub use sql::query;
pub use sql::token;

pub use db::{Database, SelectStmt};
pub use estimate::{EstimateError, EstimateOptions, EstimateResult};
