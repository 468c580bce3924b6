//! MySQL SQL dialect.
//!
//! MySQL differences from ANSI:
//! - Backtick identifier quoting (`` `name` ``)
//! - Boolean is TINYINT(1), returns 1/0
//! - Positional `?` bind parameters
//! - `EXPLAIN` is tabular (one row per table, `rows` is a column), so there is
//!   no `rows=N` annotation to read; counts fall back to `COUNT(*)`

use super::helpers;
use super::SqlDialect;

/// MySQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    // Uses default emit_limit_offset (LIMIT ... OFFSET ...)

    fn placeholder(&self, index: usize) -> String {
        helpers::placeholder_question(index)
    }

    fn supports_plan_estimate(&self) -> bool {
        false
    }
}
