//! SQL generation module.
//!
//! This module provides a type-safe SQL builder that generates multi-dialect SQL.
//! It includes:
//!
//! - [`query`] - SELECT query builder, plus the surrogate / count / explain
//!   rewrites used for row counting
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect, UnknownDriver};
pub use expr::{
    col, count, count_distinct, count_star, func, lit_bool, lit_float, lit_int, lit_null, lit_str,
    param, raw_sql, star, table_col, table_star, BinaryOperator, Expr, ExprExt, FiniteFloat,
    Literal, NonFiniteFloat, UnaryOperator,
};
pub use query::{
    FromItem, Join, JoinType, LimitOffset, OrderByExpr, Query, SelectExpr, SortDir, TableRef,
};
pub use token::{Token, TokenStream};
