//! BigQuery SQL dialect.
//!
//! - Backtick identifier quoting
//! - Positional `?` bind parameters
//! - No `EXPLAIN` statement (plans are only available after a job runs)

use super::helpers;
use super::SqlDialect;

/// BigQuery SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct BigQuery;

impl SqlDialect for BigQuery {
    fn name(&self) -> &'static str {
        "bigquery"
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
