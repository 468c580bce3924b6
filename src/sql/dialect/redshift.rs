//! Amazon Redshift SQL dialect.
//!
//! Redshift is derived from PostgreSQL 8.0:
//! - ANSI identifier quoting (`"`)
//! - Numbered bind parameters (`$1`, `$2`, ...)
//! - Text `EXPLAIN` in the Postgres shape, with `XN` prefixed node names
//!   (`XN Seq Scan on audit  (cost=0.00..0.50 rows=50 width=4)`)

use super::helpers;
use super::SqlDialect;

/// Amazon Redshift SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Redshift;

impl SqlDialect for Redshift {
    fn name(&self) -> &'static str {
        "redshift"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn placeholder(&self, index: usize) -> String {
        helpers::placeholder_dollar(index)
    }

    fn supports_plan_estimate(&self) -> bool {
        true
    }
}
