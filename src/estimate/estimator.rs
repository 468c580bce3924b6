//! Row-count estimation over a query executor.
//!
//! Engines whose `EXPLAIN` carries a `rows=N` estimate are asked for a plan;
//! every other engine gets an exact `SELECT COUNT(*)`. Each call issues
//! exactly one statement.

use tracing::{debug, trace, warn};

use super::error::{EstimateError, EstimateResult};
use super::plan::parse_plan_rows;
use super::rounding::round_count;
use crate::exec::{ExecError, QueryExecutor};
use crate::sql::dialect::{Dialect, SqlDialect};
use crate::sql::expr::Literal;
use crate::sql::query::Query;

/// Options controlling an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimateOptions {
    /// Explain a `SELECT 1` rewrite instead of the query as written.
    pub surrogate_query: bool,
    /// Round plan estimates to one significant digit.
    pub round: bool,
    /// Always run `SELECT COUNT(*)`, even when a plan estimate is available.
    pub force_exact: bool,
}

impl Default for EstimateOptions {
    fn default() -> Self {
        Self {
            surrogate_query: true,
            round: true,
            force_exact: false,
        }
    }
}

impl EstimateOptions {
    pub fn new(surrogate_query: bool, round: bool) -> Self {
        Self {
            surrogate_query,
            round,
            force_exact: false,
        }
    }

    pub fn exact() -> Self {
        Self {
            force_exact: true,
            ..Self::default()
        }
    }
}

/// How a count is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `EXPLAIN` the statement and read the planner's row estimate.
    PlanEstimate,
    /// Run `SELECT COUNT(*)` and return the scalar unrounded.
    ExactCount,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::PlanEstimate => write!(f, "plan estimate"),
            Strategy::ExactCount => write!(f, "exact count"),
        }
    }
}

/// The single statement a count will issue.
#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    pub strategy: Strategy,
    pub sql: String,
    pub args: Vec<Literal>,
}

impl Probe {
    /// Build the statement for `query` without executing anything.
    pub fn build(query: &Query, dialect: Dialect, options: EstimateOptions) -> Self {
        let strategy = if options.force_exact || !dialect.supports_plan_estimate() {
            Strategy::ExactCount
        } else {
            Strategy::PlanEstimate
        };

        let (sql, args) = match strategy {
            Strategy::ExactCount => query.count_query().to_sql_with_args(dialect),
            Strategy::PlanEstimate if options.surrogate_query => query
                .surrogate()
                .explain_tokens(dialect)
                .serialize_with_args(dialect),
            Strategy::PlanEstimate => query.explain_tokens(dialect).serialize_with_args(dialect),
        };

        Self {
            strategy,
            sql,
            args,
        }
    }
}

/// Estimates row counts for queries in one dialect.
pub struct Estimator<'a> {
    executor: &'a dyn QueryExecutor,
    dialect: Dialect,
}

impl<'a> Estimator<'a> {
    pub fn new(executor: &'a dyn QueryExecutor, dialect: Dialect) -> Self {
        Self { executor, dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Estimate the number of rows `query` returns.
    ///
    /// Plan estimates are rounded when `options.round` is set; exact counts
    /// never are.
    pub async fn estimate(&self, query: &Query, options: EstimateOptions) -> EstimateResult<u64> {
        let probe = Probe::build(query, self.dialect, options);
        debug!(
            dialect = %self.dialect,
            strategy = %probe.strategy,
            sql = %probe.sql,
            args = probe.args.len(),
            "counting rows"
        );

        match probe.strategy {
            Strategy::ExactCount => self.run_count(&probe).await,
            Strategy::PlanEstimate => {
                let rows = self
                    .executor
                    .execute_row_query(&probe.sql, &probe.args)
                    .await
                    .map_err(|err| {
                        warn!(dialect = %self.dialect, error = %err, "plan probe failed");
                        EstimateError::ExecutionFailed(err)
                    })?;

                let estimate = parse_plan_rows(&rows).inspect_err(|err| {
                    warn!(dialect = %self.dialect, lines = rows.len(), error = %err, "unreadable plan");
                })?;
                trace!(estimate, "planner row estimate");

                Ok(round_count(estimate, options.round))
            }
        }
    }

    /// Count the rows `query` returns with `SELECT COUNT(*)`.
    pub async fn exact_count(&self, query: &Query) -> EstimateResult<u64> {
        self.estimate(query, EstimateOptions::exact()).await
    }

    async fn run_count(&self, probe: &Probe) -> EstimateResult<u64> {
        let count = self
            .executor
            .execute_scalar_query(&probe.sql, &probe.args)
            .await
            .map_err(|err| {
                warn!(dialect = %self.dialect, error = %err, "count query failed");
                EstimateError::ExecutionFailed(err)
            })?;

        u64::try_from(count).map_err(|_| {
            EstimateError::ExecutionFailed(ExecError::UnexpectedValue(format!(
                "negative row count {}",
                count
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::expr::{col, param, ExprExt};
    use insta::assert_snapshot;

    fn audit() -> Query {
        Query::new()
            .select(vec![col("id"), col("actor")])
            .from("audit")
            .filter(col("result").eq(param(2)))
    }

    #[test]
    fn test_strategy_follows_capability() {
        for dialect in Dialect::ALL {
            let probe = Probe::build(&audit(), dialect, EstimateOptions::default());
            let expected = if dialect.supports_plan_estimate() {
                Strategy::PlanEstimate
            } else {
                Strategy::ExactCount
            };
            assert_eq!(probe.strategy, expected, "{}", dialect);
        }
    }

    #[test]
    fn test_force_exact() {
        let probe = Probe::build(&audit(), Dialect::Postgres, EstimateOptions::exact());
        assert_eq!(probe.strategy, Strategy::ExactCount);
        assert!(probe.sql.starts_with("SELECT\n  COUNT(*)"));
    }

    #[test]
    fn test_surrogate_probe() {
        let probe = Probe::build(&audit(), Dialect::Postgres, EstimateOptions::new(true, true));
        assert_snapshot!(probe.sql, @r#"
        EXPLAIN SELECT
          1
        FROM "audit"
        WHERE "result" = $1
        "#);
        assert_eq!(probe.args, vec![Literal::Int(2)]);
    }

    #[test]
    fn test_verbatim_probe() {
        let probe = Probe::build(&audit(), Dialect::Redshift, EstimateOptions::new(false, true));
        assert_snapshot!(probe.sql, @r#"
        EXPLAIN SELECT
          "id",
          "actor"
        FROM "audit"
        WHERE "result" = $1
        "#);
    }

    #[test]
    fn test_count_probe_for_mysql() {
        let probe = Probe::build(&audit(), Dialect::MySql, EstimateOptions::default());
        assert_snapshot!(probe.sql, @r"
        SELECT
          COUNT(*)
        FROM `audit`
        WHERE `result` = ?
        ");
        assert_eq!(probe.args, vec![Literal::Int(2)]);
    }
}
