//! Databricks (Spark SQL) dialect.
//!
//! - Backtick identifier quoting
//! - Positional `?` bind parameters
//! - `EXPLAIN` prints logical/physical plans; row counts only appear as
//!   `Statistics(rowCount=...)` under `EXPLAIN COST` and only when table
//!   statistics were computed, so counts fall back to `COUNT(*)`

use super::helpers;
use super::SqlDialect;

/// Databricks SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Databricks;

impl SqlDialect for Databricks {
    fn name(&self) -> &'static str {
        "databricks"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn placeholder(&self, index: usize) -> String {
        helpers::placeholder_question(index)
    }

    fn supports_plan_estimate(&self) -> bool {
        false
    }
}
