//! DuckDB SQL dialect.
//!
//! DuckDB is PostgreSQL-compatible at the syntax level:
//! - ANSI identifier quoting (`"`)
//! - Positional `?` bind parameters
//! - `EXPLAIN` renders a box-drawn physical plan whose cardinalities are
//!   `EC: N` / `~N Rows`, never `rows=N`; counts fall back to `COUNT(*)`

use super::helpers;
use super::SqlDialect;

/// DuckDB SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct DuckDb;

impl SqlDialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
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
