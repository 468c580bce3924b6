//! Snowflake SQL dialect.
//!
//! - ANSI identifier quoting (`"`)
//! - Positional `?` bind parameters
//! - `EXPLAIN` returns a tabular operator list with partition and byte
//!   counts but no row estimates

use super::helpers;
use super::SqlDialect;

/// Snowflake SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Snowflake;

impl SqlDialect for Snowflake {
    fn name(&self) -> &'static str {
        "snowflake"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
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
