//! Query builder - construct SELECT statements with a fluent API.
//!
//! Besides rendering, a [`Query`] can derive the two probe statements used for
//! row counting: a constant-projection [`Query::surrogate`] for `EXPLAIN`, and
//! an exact [`Query::count_query`].

use super::dialect::{Dialect, SqlDialect};
use super::expr::{count_star, lit_int, Expr, ExprExt, Literal};
use super::token::{Token, TokenStream};

/// Alias given to the derived table when a count has to wrap the original query.
pub const COUNT_SUBQUERY_ALIAS: &str = "counted";

// =============================================================================
// Select Expression (column with optional alias)
// =============================================================================

/// A SELECT list item: expression with optional alias.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct SelectExpr {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectExpr {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = self.expr.to_tokens_for_dialect(dialect);
        if let Some(alias) = &self.alias {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(alias.clone()));
        }
        ts
    }
}

impl From<Expr> for SelectExpr {
    fn from(expr: Expr) -> Self {
        SelectExpr::new(expr)
    }
}

// =============================================================================
// FROM sources
// =============================================================================

/// A table reference with optional schema and alias.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct TableRef {
    pub schema: Option<String>,
    pub table: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(table: &str) -> Self {
        Self {
            schema: None,
            table: table.into(),
            alias: None,
        }
    }

    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::QualifiedIdent {
            schema: self.schema.clone(),
            name: self.table.clone(),
        });
        if let Some(alias) = &self.alias {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(alias.clone()));
        }
        ts
    }
}

impl From<&str> for TableRef {
    fn from(table: &str) -> Self {
        TableRef::new(table)
    }
}

/// What a query reads from: a named table or a derived table.
#[derive(Debug, Clone, PartialEq)]
pub enum FromItem {
    Table(TableRef),
    Derived { query: Box<Query>, alias: String },
}

impl FromItem {
    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        match self {
            FromItem::Table(table) => table.to_tokens(),
            FromItem::Derived { query, alias } => {
                let mut ts = TokenStream::new();
                ts.lparen()
                    .append(&query.to_tokens_for_dialect(dialect))
                    .rparen()
                    .space()
                    .push(Token::As)
                    .space()
                    .push(Token::Ident(alias.clone()));
                ts
            }
        }
    }
}

// =============================================================================
// Joins
// =============================================================================

/// Type of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: TableRef,
    pub on: Expr,
}

impl Join {
    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        match self.join_type {
            JoinType::Inner => ts.push(Token::Inner),
            JoinType::Left => ts.push(Token::Left),
            JoinType::Right => ts.push(Token::Right),
            JoinType::Full => ts.push(Token::Full).space().push(Token::Outer),
        };

        ts.space().push(Token::Join).space();
        ts.append(&self.table.to_tokens());

        ts.space().push(Token::On).space();
        ts.append(&self.on.to_tokens_for_dialect(dialect));

        ts
    }
}

// =============================================================================
// ORDER BY
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

/// An ORDER BY expression.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct OrderByExpr {
    pub expr: Expr,
    pub dir: Option<SortDir>,
}

impl OrderByExpr {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            dir: Some(SortDir::Asc),
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            dir: Some(SortDir::Desc),
        }
    }

    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = self.expr.to_tokens_for_dialect(dialect);
        if let Some(dir) = &self.dir {
            ts.space().push(match dir {
                SortDir::Asc => Token::Asc,
                SortDir::Desc => Token::Desc,
            });
        }
        ts
    }
}

/// LIMIT and OFFSET clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LimitOffset {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl LimitOffset {
    /// Delegates to `SqlDialect::emit_limit_offset()` for the actual formatting.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        dialect.emit_limit_offset(self.limit, self.offset)
    }
}

// =============================================================================
// Query Builder
// =============================================================================

/// A SELECT query.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use = "Query has no effect until converted to SQL with to_sql() or to_tokens()"]
pub struct Query {
    pub select: Vec<SelectExpr>,
    pub distinct: bool,
    pub from: Option<FromItem>,
    pub joins: Vec<Join>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderByExpr>,
    pub limit_offset: Option<LimitOffset>,
}

impl Query {
    /// Create a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the SELECT list.
    pub fn select(mut self, exprs: Vec<impl Into<SelectExpr>>) -> Self {
        self.select = exprs.into_iter().map(|e| e.into()).collect();
        self
    }

    /// SELECT *
    pub fn select_star(mut self) -> Self {
        self.select = vec![SelectExpr::new(super::expr::star())];
        self
    }

    /// Add DISTINCT.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Set the FROM table.
    pub fn from(mut self, table: impl Into<TableRef>) -> Self {
        self.from = Some(FromItem::Table(table.into()));
        self
    }

    /// Read from a derived table: `FROM (<query>) AS alias`.
    pub fn from_subquery(mut self, query: Query, alias: &str) -> Self {
        self.from = Some(FromItem::Derived {
            query: Box::new(query),
            alias: alias.into(),
        });
        self
    }

    /// Add a JOIN.
    pub fn join(mut self, join_type: JoinType, table: TableRef, on: Expr) -> Self {
        self.joins.push(Join {
            join_type,
            table,
            on,
        });
        self
    }

    /// Add an INNER JOIN.
    pub fn inner_join(self, table: TableRef, on: Expr) -> Self {
        self.join(JoinType::Inner, table, on)
    }

    /// Add a LEFT JOIN.
    pub fn left_join(self, table: TableRef, on: Expr) -> Self {
        self.join(JoinType::Left, table, on)
    }

    /// Add a WHERE condition (ANDed with existing conditions).
    pub fn filter(mut self, condition: Expr) -> Self {
        self.where_clause = Some(match self.where_clause {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    /// Set the GROUP BY clause.
    pub fn group_by(mut self, exprs: Vec<Expr>) -> Self {
        self.group_by = exprs;
        self
    }

    /// Set the HAVING clause.
    pub fn having(mut self, condition: Expr) -> Self {
        self.having = Some(condition);
        self
    }

    /// Set the ORDER BY clause.
    pub fn order_by(mut self, exprs: Vec<OrderByExpr>) -> Self {
        self.order_by = exprs;
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_offset.get_or_insert_with(LimitOffset::default).limit = Some(limit);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, offset: u64) -> Self {
        self.limit_offset.get_or_insert_with(LimitOffset::default).offset = Some(offset);
        self
    }

    // =========================================================================
    // Row-count probes
    // =========================================================================

    /// Whether the row count depends on more than FROM/JOIN/WHERE.
    ///
    /// Such queries cannot have their projection swapped for `COUNT(*)`
    /// directly and are counted through a derived table instead.
    pub fn is_reshaped(&self) -> bool {
        self.distinct
            || !self.group_by.is_empty()
            || self.having.is_some()
            || self.limit_offset.is_some()
    }

    /// The same statement with its projection replaced by the constant `1`.
    ///
    /// FROM, JOIN, WHERE, GROUP BY, HAVING and LIMIT/OFFSET are kept, so the
    /// planner's row estimate is unchanged while it has nothing to project.
    /// ORDER BY is dropped unless paging needs it. A DISTINCT query keeps its
    /// projection since `DISTINCT 1` would collapse to a single row.
    pub fn surrogate(&self) -> Query {
        let mut probe = self.clone();
        if !probe.distinct {
            probe.select = vec![SelectExpr::new(lit_int(1))];
        }
        if probe.limit_offset.is_none() {
            probe.order_by.clear();
        }
        probe
    }

    /// `SELECT COUNT(*)` over the same rows this query returns.
    pub fn count_query(&self) -> Query {
        if self.is_reshaped() {
            let mut inner = self.clone();
            if inner.limit_offset.is_none() {
                inner.order_by.clear();
            }
            return Query::new()
                .select(vec![count_star()])
                .from_subquery(inner, COUNT_SUBQUERY_ALIAS);
        }

        let mut counted = self.clone();
        counted.select = vec![SelectExpr::new(count_star())];
        counted.order_by.clear();
        counted
    }

    /// Token stream for `EXPLAIN <query>` in the given dialect.
    pub fn explain_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Explain)
            .space()
            .append(&self.to_tokens_for_dialect(dialect));
        ts
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Convert to token stream (default dialect).
    pub fn to_tokens(&self) -> TokenStream {
        self.to_tokens_for_dialect(Dialect::default())
    }

    /// Convert to token stream for a specific dialect.
    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        // SELECT
        ts.push(Token::Select);
        if self.distinct {
            ts.space().push(Token::Distinct);
        }

        // Columns
        for (i, select_expr) in self.select.iter().enumerate() {
            if i == 0 {
                ts.newline().indent(1);
            } else {
                ts.comma().newline().indent(1);
            }
            ts.append(&select_expr.to_tokens_for_dialect(dialect));
        }

        // FROM
        if let Some(from) = &self.from {
            ts.newline().push(Token::From).space();
            ts.append(&from.to_tokens_for_dialect(dialect));
        }

        // JOINs
        for join in &self.joins {
            ts.newline();
            ts.append(&join.to_tokens_for_dialect(dialect));
        }

        // WHERE
        if let Some(where_clause) = &self.where_clause {
            ts.newline().push(Token::Where).space();
            ts.append(&where_clause.to_tokens_for_dialect(dialect));
        }

        // GROUP BY
        if !self.group_by.is_empty() {
            ts.newline().push(Token::GroupBy).space();
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&expr.to_tokens_for_dialect(dialect));
            }
        }

        // HAVING
        if let Some(having) = &self.having {
            ts.newline().push(Token::Having).space();
            ts.append(&having.to_tokens_for_dialect(dialect));
        }

        // ORDER BY
        // T-SQL requires ORDER BY for OFFSET FETCH; without one we emit
        // ORDER BY (SELECT NULL), which leaves row order unspecified.
        let needs_order_by_placeholder = dialect.requires_order_by_for_offset()
            && self.order_by.is_empty()
            && self.limit_offset.is_some();

        if !self.order_by.is_empty() {
            ts.newline().push(Token::OrderBy).space();
            for (i, order_expr) in self.order_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&order_expr.to_tokens_for_dialect(dialect));
            }
        } else if needs_order_by_placeholder {
            ts.newline()
                .push(Token::OrderBy)
                .space()
                .lparen()
                .push(Token::Select)
                .space()
                .push(Token::Null)
                .rparen();
        }

        // LIMIT / OFFSET
        if let Some(lo) = &self.limit_offset {
            ts.newline();
            ts.append(&lo.to_tokens(dialect));
        }

        ts
    }

    /// Generate SQL string for a specific dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens_for_dialect(dialect).serialize(dialect)
    }

    /// Generate SQL plus the bound arguments, in placeholder order.
    pub fn to_sql_with_args(&self, dialect: Dialect) -> (String, Vec<Literal>) {
        self.to_tokens_for_dialect(dialect)
            .serialize_with_args(dialect)
    }
}

impl std::fmt::Display for Query {
    /// Formats the query using the default dialect (DuckDB).
    ///
    /// For dialect-specific SQL, use [`Query::to_sql`] instead.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_sql(Dialect::default()))
    }
}

// =============================================================================
// Tests
// =============================================================================
