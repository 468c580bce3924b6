//! Statements bound to a database.
//!
//! [`Database`] pairs an executor with the dialect it speaks; the
//! [`SelectStmt`] it starts mirrors the [`Query`] builder and can count its
//! own rows.
//!
//! ```ignore
//! use approxcount::db::Database;
//! use approxcount::sql::{col, param, ExprExt};
//!
//! let db = Database::new(executor, Dialect::Postgres);
//! let rows = db
//!     .select_star()
//!     .from("audit")
//!     .filter(col("result").eq(param(2)))
//!     .estimated_count(true, true)
//!     .await?;
//! ```

use std::sync::Arc;

use crate::estimate::{EstimateOptions, EstimateResult, Estimator, Probe};
use crate::exec::QueryExecutor;
use crate::sql::dialect::Dialect;
use crate::sql::expr::{Expr, Literal};
use crate::sql::query::{JoinType, OrderByExpr, Query, SelectExpr, TableRef};

/// An executor together with the SQL dialect it accepts.
#[derive(Clone)]
pub struct Database {
    executor: Arc<dyn QueryExecutor>,
    dialect: Dialect,
}

impl Database {
    pub fn new(executor: Arc<dyn QueryExecutor>, dialect: Dialect) -> Self {
        Self { executor, dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn executor(&self) -> &dyn QueryExecutor {
        self.executor.as_ref()
    }

    /// Start a SELECT with the given projection.
    pub fn select(&self, exprs: Vec<impl Into<SelectExpr>>) -> SelectStmt {
        SelectStmt::new(self.clone(), Query::new().select(exprs))
    }

    /// Start a `SELECT *`.
    pub fn select_star(&self) -> SelectStmt {
        SelectStmt::new(self.clone(), Query::new().select_star())
    }

    /// Bind an already-built query.
    pub fn statement(&self, query: Query) -> SelectStmt {
        SelectStmt::new(self.clone(), query)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

/// A SELECT statement bound to a [`Database`].
#[derive(Debug, Clone)]
#[must_use = "SelectStmt has no effect until counted or rendered"]
pub struct SelectStmt {
    db: Database,
    query: Query,
}

impl SelectStmt {
    fn new(db: Database, query: Query) -> Self {
        Self { db, query }
    }

    fn map(mut self, f: impl FnOnce(Query) -> Query) -> Self {
        self.query = f(self.query);
        self
    }

    // =========================================================================
    // Builder
    // =========================================================================

    pub fn distinct(self) -> Self {
        self.map(Query::distinct)
    }

    pub fn from(self, table: impl Into<TableRef>) -> Self {
        self.map(|q| q.from(table))
    }

    pub fn join(self, join_type: JoinType, table: TableRef, on: Expr) -> Self {
        self.map(|q| q.join(join_type, table, on))
    }

    pub fn inner_join(self, table: TableRef, on: Expr) -> Self {
        self.map(|q| q.inner_join(table, on))
    }

    pub fn left_join(self, table: TableRef, on: Expr) -> Self {
        self.map(|q| q.left_join(table, on))
    }

    /// Add a WHERE condition (ANDed with any existing one).
    pub fn filter(self, condition: Expr) -> Self {
        self.map(|q| q.filter(condition))
    }

    pub fn group_by(self, exprs: Vec<Expr>) -> Self {
        self.map(|q| q.group_by(exprs))
    }

    pub fn having(self, condition: Expr) -> Self {
        self.map(|q| q.having(condition))
    }

    pub fn order_by(self, exprs: Vec<OrderByExpr>) -> Self {
        self.map(|q| q.order_by(exprs))
    }

    pub fn limit(self, limit: u64) -> Self {
        self.map(|q| q.limit(limit))
    }

    pub fn offset(self, offset: u64) -> Self {
        self.map(|q| q.offset(offset))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn dialect(&self) -> Dialect {
        self.db.dialect
    }

    /// Render the statement in its database's dialect.
    pub fn to_sql(&self) -> String {
        self.query.to_sql(self.db.dialect)
    }

    /// Render the statement plus its bound arguments.
    pub fn to_sql_with_args(&self) -> (String, Vec<Literal>) {
        self.query.to_sql_with_args(self.db.dialect)
    }

    /// The statement a count with `options` would send, without sending it.
    pub fn count_probe(&self, options: EstimateOptions) -> Probe {
        Probe::build(&self.query, self.db.dialect, options)
    }

    // =========================================================================
    // Counting
    // =========================================================================

    /// Approximate number of rows this statement returns.
    ///
    /// On engines with plan estimates, `EXPLAIN`s the statement (or its
    /// `SELECT 1` surrogate when `create_surrogate_query` is set) and reads
    /// the planner's row estimate, rounded to one significant digit when
    /// `round_result` is set. Elsewhere runs an exact `COUNT(*)`.
    pub async fn estimated_count(
        &self,
        create_surrogate_query: bool,
        round_result: bool,
    ) -> EstimateResult<u64> {
        self.estimated_count_with(EstimateOptions::new(create_surrogate_query, round_result))
            .await
    }

    pub async fn estimated_count_with(&self, options: EstimateOptions) -> EstimateResult<u64> {
        Estimator::new(self.db.executor(), self.db.dialect)
            .estimate(&self.query, options)
            .await
    }

    /// Exact number of rows, via `SELECT COUNT(*)` on every engine.
    pub async fn exact_count(&self) -> EstimateResult<u64> {
        Estimator::new(self.db.executor(), self.db.dialect)
            .exact_count(&self.query)
            .await
    }
}
