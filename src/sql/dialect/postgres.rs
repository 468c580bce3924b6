//! PostgreSQL SQL dialect.
//!
//! PostgreSQL features relevant here:
//! - ANSI identifier quoting (`"`)
//! - Native boolean type (true/false)
//! - Numbered bind parameters (`$1`, `$2`, ...)
//! - Text `EXPLAIN` output annotating every plan node with
//!   `(cost=start..total rows=N width=W)`, so row counts can be estimated
//!   from the plan without running the query

use super::helpers;
use super::SqlDialect;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    // Uses default emit_limit_offset (LIMIT ... OFFSET ...)

    fn placeholder(&self, index: usize) -> String {
        helpers::placeholder_dollar(index)
    }

    fn supports_plan_estimate(&self) -> bool {
        true
    }
}
