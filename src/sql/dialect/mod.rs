//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for SQL dialect differences.
//! Each dialect implements `SqlDialect` to handle its specific syntax:
//!
//! - Identifier quoting: `"` (ANSI/PG/DuckDB), `` ` `` (MySQL), `[]` (T-SQL)
//! - Pagination: LIMIT/OFFSET vs OFFSET FETCH
//! - Boolean literals: true/false vs 1/0
//! - Bind placeholders: `$1` vs `?` vs `@p1`
//! - Whether `EXPLAIN` reports a `rows=N` planner estimate
//!
//! # Usage
//!
//! ```ignore
//! use approxcount::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::from_driver("pgx")?;
//! assert!(dialect.supports_plan_estimate());
//! ```
//!
//! # Plan estimates
//!
//! | Engine | `EXPLAIN` row estimate | Counting strategy |
//! |--------|------------------------|-------------------|
//! | PostgreSQL | `rows=N` per plan node | plan probe |
//! | Redshift | `rows=N` per plan node | plan probe |
//! | MySQL | tabular `rows` column | `COUNT(*)` |
//! | SQL Server | no `EXPLAIN` | `COUNT(*)` |
//! | DuckDB | `EC: N` | `COUNT(*)` |
//! | Snowflake | none | `COUNT(*)` |
//! | BigQuery | none | `COUNT(*)` |
//! | Databricks | `rowCount=` (stats only) | `COUNT(*)` |

mod bigquery;
mod databricks;
mod duckdb;
pub mod helpers;
mod mysql;
mod postgres;
mod redshift;
mod snowflake;
mod tsql;

pub use bigquery::BigQuery;
pub use databricks::Databricks;
pub use duckdb::DuckDb;
pub use mysql::MySql;
pub use postgres::Postgres;
pub use redshift::Redshift;
pub use snowflake::Snowflake;
pub use tsql::TSql;

use std::str::FromStr;

use thiserror::Error;

use super::token::TokenStream;

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// Implementations handle dialect-specific syntax differences.
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    ///
    /// - ANSI/PostgreSQL/DuckDB: `"identifier"`
    /// - MySQL: `` `identifier` ``
    /// - T-SQL: `[identifier]`
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    ///
    /// All dialects use single quotes with `''` for escaping.
    /// Override for Unicode prefix (T-SQL N'...').
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    ///
    /// - PostgreSQL/DuckDB: `true`/`false`
    /// - MySQL/T-SQL: `1`/`0`
    fn format_bool(&self, b: bool) -> &'static str;

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Emit LIMIT/OFFSET or equivalent pagination clause.
    ///
    /// - PostgreSQL/DuckDB/MySQL: `LIMIT n OFFSET m` (default)
    /// - T-SQL: `OFFSET m ROWS FETCH NEXT n ROWS ONLY` (override)
    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_standard(limit, offset)
    }

    /// Whether OFFSET requires ORDER BY clause.
    ///
    /// T-SQL requires ORDER BY for OFFSET FETCH.
    fn requires_order_by_for_offset(&self) -> bool {
        false
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Bind placeholder for the `index`-th parameter (1-based).
    fn placeholder(&self, index: usize) -> String {
        helpers::placeholder_question(index)
    }

    // =========================================================================
    // Plan Estimates
    // =========================================================================

    /// Statement prefix that asks the planner for a plan instead of rows.
    fn explain_prefix(&self) -> &'static str {
        "EXPLAIN"
    }

    /// Whether `EXPLAIN` output carries a `rows=N` estimate the plan parser
    /// can read. Every dialect must answer explicitly.
    fn supports_plan_estimate(&self) -> bool;
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    DuckDb,
    TSql,
    MySql,
    Postgres,
    Snowflake,
    BigQuery,
    Redshift,
    Databricks,
}

/// A driver or dialect name that maps to no known engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown database driver '{0}'")]
pub struct UnknownDriver(pub String);

impl Dialect {
    /// Every dialect, in declaration order.
    pub const ALL: [Dialect; 8] = [
        Dialect::DuckDb,
        Dialect::TSql,
        Dialect::MySql,
        Dialect::Postgres,
        Dialect::Snowflake,
        Dialect::BigQuery,
        Dialect::Redshift,
        Dialect::Databricks,
    ];

    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::DuckDb => &DuckDb,
            Dialect::Postgres => &Postgres,
            Dialect::TSql => &TSql,
            Dialect::MySql => &MySql,
            Dialect::Snowflake => &Snowflake,
            Dialect::BigQuery => &BigQuery,
            Dialect::Redshift => &Redshift,
            Dialect::Databricks => &Databricks,
        }
    }

    /// Resolve a database driver name to its dialect.
    ///
    /// Accepts the common driver aliases (`pgx`, `postgresql`, `mssql`, ...)
    /// as well as the dialect names themselves. Matching ignores ASCII case.
    pub fn from_driver(driver: &str) -> Result<Self, UnknownDriver> {
        let dialect = match driver.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pgx" | "pq" => Dialect::Postgres,
            "redshift" => Dialect::Redshift,
            "mysql" | "mariadb" => Dialect::MySql,
            "tsql" | "mssql" | "sqlserver" | "sql_server" => Dialect::TSql,
            "duckdb" | "duck" => Dialect::DuckDb,
            "snowflake" => Dialect::Snowflake,
            "bigquery" => Dialect::BigQuery,
            "databricks" | "spark" => Dialect::Databricks,
            _ => return Err(UnknownDriver(driver.to_string())),
        };
        Ok(dialect)
    }
}

impl FromStr for Dialect {
    type Err = UnknownDriver;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::from_driver(s)
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        self.dialect().emit_limit_offset(limit, offset)
    }

    fn requires_order_by_for_offset(&self) -> bool {
        self.dialect().requires_order_by_for_offset()
    }

    fn placeholder(&self, index: usize) -> String {
        self.dialect().placeholder(index)
    }

    fn explain_prefix(&self) -> &'static str {
        self.dialect().explain_prefix()
    }

    fn supports_plan_estimate(&self) -> bool {
        self.dialect().supports_plan_estimate()
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
