//! T-SQL (SQL Server / Azure SQL) dialect.
//!
//! T-SQL differences from ANSI:
//! - Square bracket identifier quoting (`[name]`)
//! - OFFSET FETCH for pagination (requires ORDER BY)
//! - N'...' prefix for Unicode strings
//! - Named `@pN` bind parameters
//! - No `EXPLAIN` statement; plans come from `SET SHOWPLAN_*` session
//!   options, so counts fall back to `COUNT(*)`

use super::helpers;
use super::SqlDialect;
use crate::sql::token::TokenStream;

/// T-SQL (SQL Server) dialect.
#[derive(Debug, Clone, Copy)]
pub struct TSql;

impl SqlDialect for TSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_bracket(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        if !s.is_ascii() {
            helpers::quote_string_unicode(s)
        } else {
            helpers::quote_string_single(s)
        }
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_tsql(limit, offset)
    }

    fn requires_order_by_for_offset(&self) -> bool {
        true
    }

    fn placeholder(&self, index: usize) -> String {
        helpers::placeholder_at(index)
    }

    fn supports_plan_estimate(&self) -> bool {
        false
    }
}
