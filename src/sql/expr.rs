//! Expression AST for WHERE / HAVING / JOIN conditions and SELECT lists.
//!
//! Values that come from callers should be bound with [`param`] so they are
//! sent to the database as arguments rather than spliced into the SQL text.

use thiserror::Error;

use super::dialect::Dialect;
use super::token::{Token, TokenStream};

// =============================================================================
// Expression AST
// =============================================================================

/// A SQL expression.
///
/// Every variant must be handled in `to_tokens_for_dialect()` - the compiler enforces this.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference: optional_table.column
    Column {
        table: Option<String>,
        column: String,
    },

    /// Literal inlined into the SQL text
    Literal(Literal),

    /// Bound parameter: rendered as a placeholder, value returned as an argument
    Param(Literal),

    /// Binary operation: left op right
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// Unary operation: op expr
    UnaryOp { op: UnaryOperator, expr: Box<Expr> },

    /// Function call: name(args...)
    Function {
        name: String,
        args: Vec<Expr>,
        distinct: bool,
    },

    /// Subquery: (SELECT ...)
    Subquery(Box<super::query::Query>),

    /// IN: expr IN (values...)
    In {
        expr: Box<Expr>,
        values: Vec<Expr>,
        negated: bool,
    },

    /// BETWEEN: expr BETWEEN low AND high
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },

    /// IS NULL / IS NOT NULL
    IsNull { expr: Box<Expr>, negated: bool },

    /// Wildcard: * or table.*
    Star { table: Option<String> },

    /// Parenthesized expression
    Paren(Box<Expr>),

    /// Raw SQL expression passed directly to output without escaping.
    ///
    /// # Security Warning
    ///
    /// **Never pass user input to this variant.** Use [`Expr::Param`] for
    /// caller-supplied values.
    Raw(String),
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(FiniteFloat),
    String(String),
    Bool(bool),
    Null,
}

impl Literal {
    /// JSON form used when the value travels as a bound argument.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Literal::Int(n) => serde_json::Value::from(*n),
            Literal::Float(f) => serde_json::Value::from(f.get()),
            Literal::String(s) => serde_json::Value::from(s.as_str()),
            Literal::Bool(b) => serde_json::Value::from(*b),
            Literal::Null => serde_json::Value::Null,
        }
    }
}

/// A float that SQL can represent: never NaN or infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiniteFloat(f64);

impl FiniteFloat {
    pub fn get(self) -> f64 {
        self.0
    }
}

/// NaN and infinities have no SQL literal and no JSON argument form.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("cannot use non-finite float {0} as a SQL value")]
pub struct NonFiniteFloat(pub f64);

impl TryFrom<f64> for FiniteFloat {
    type Error = NonFiniteFloat;

    fn try_from(f: f64) -> Result<Self, Self::Error> {
        if f.is_finite() {
            Ok(FiniteFloat(f))
        } else {
            Err(NonFiniteFloat(f))
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    // Logical
    And,
    Or,
    // Arithmetic
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    // String
    Like,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
}

impl Expr {
    /// Convert this expression to a token stream (default dialect).
    pub fn to_tokens(&self) -> TokenStream {
        self.to_tokens_for_dialect(Dialect::default())
    }

    /// Convert this expression to a token stream for a specific dialect.
    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        match self {
            Expr::Column { table, column } => {
                if let Some(t) = table {
                    ts.push(Token::Ident(t.clone()));
                    ts.push(Token::Dot);
                }
                ts.push(Token::Ident(column.clone()));
            }

            Expr::Literal(lit) => {
                ts.push(match lit {
                    Literal::Int(n) => Token::LitInt(*n),
                    Literal::Float(f) => Token::LitFloat(*f),
                    Literal::String(s) => Token::LitString(s.clone()),
                    Literal::Bool(b) => Token::LitBool(*b),
                    Literal::Null => Token::LitNull,
                });
            }

            Expr::Param(value) => {
                ts.push(Token::Placeholder(value.clone()));
            }

            Expr::BinaryOp { left, op, right } => {
                let prec = op.precedence();
                // Right operand at equal precedence keeps its grouping unless the op is associative.
                let right_min = if op.is_associative() { prec } else { prec + 1 };
                ts.append(&left.operand_tokens(prec, dialect));
                ts.space();
                ts.push(binary_op_to_token(*op));
                ts.space();
                ts.append(&right.operand_tokens(right_min, dialect));
            }

            Expr::UnaryOp { op, expr } => {
                ts.push(match op {
                    UnaryOperator::Not => Token::Not,
                    UnaryOperator::Minus => Token::Minus,
                });
                ts.space();
                ts.append(&expr.operand_tokens(self.precedence(), dialect));
            }

            Expr::Function {
                name,
                args,
                distinct,
            } => {
                ts.push(Token::FunctionName(name.clone()));
                ts.lparen();
                if *distinct {
                    ts.push(Token::Distinct).space();
                }
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&arg.to_tokens_for_dialect(dialect));
                }
                ts.rparen();
            }

            Expr::Subquery(query) => {
                ts.lparen();
                ts.append(&query.to_tokens_for_dialect(dialect));
                ts.rparen();
            }

            Expr::In {
                expr,
                values,
                negated,
            } => {
                // "x IN ()" is invalid SQL; it is always FALSE (TRUE when negated)
                if values.is_empty() {
                    ts.push(if *negated { Token::True } else { Token::False });
                } else {
                    ts.append(&expr.operand_tokens(PREC_ADDITIVE, dialect));
                    if *negated {
                        ts.space().push(Token::Not);
                    }
                    ts.space().push(Token::In).space().lparen();
                    for (i, val) in values.iter().enumerate() {
                        if i > 0 {
                            ts.comma().space();
                        }
                        ts.append(&val.to_tokens_for_dialect(dialect));
                    }
                    ts.rparen();
                }
            }

            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                ts.append(&expr.operand_tokens(PREC_ADDITIVE, dialect));
                if *negated {
                    ts.space().push(Token::Not);
                }
                ts.space().push(Token::Between).space();
                ts.append(&low.operand_tokens(PREC_ADDITIVE, dialect));
                ts.space().push(Token::And).space();
                ts.append(&high.operand_tokens(PREC_ADDITIVE, dialect));
            }

            Expr::IsNull { expr, negated } => {
                ts.append(&expr.operand_tokens(PREC_ADDITIVE, dialect));
                ts.space();
                ts.push(if *negated {
                    Token::IsNotNull
                } else {
                    Token::IsNull
                });
            }

            Expr::Star { table } => {
                if let Some(t) = table {
                    ts.push(Token::Ident(t.clone()));
                    ts.push(Token::Dot);
                }
                ts.push(Token::Star);
            }

            Expr::Paren(inner) => {
                ts.lparen();
                ts.append(&inner.to_tokens_for_dialect(dialect));
                ts.rparen();
            }

            Expr::Raw(sql) => {
                ts.push(Token::Raw(sql.clone()));
            }
        }

        ts
    }

    /// Binding strength of this expression's outermost operator.
    /// Atoms (columns, literals, calls, parenthesized groups) never need wrapping.
    fn precedence(&self) -> u8 {
        match self {
            Expr::BinaryOp { op, .. } => op.precedence(),
            Expr::UnaryOp {
                op: UnaryOperator::Not,
                ..
            } => PREC_NOT,
            Expr::UnaryOp {
                op: UnaryOperator::Minus,
                ..
            } => PREC_NEGATE,
            Expr::In { values, .. } if values.is_empty() => PREC_ATOM,
            Expr::In { .. } | Expr::Between { .. } | Expr::IsNull { .. } => PREC_COMPARISON,
            // Opaque text may hold any operator.
            Expr::Raw(_) => PREC_RAW,
            _ => PREC_ATOM,
        }
    }

    /// Render as an operand, wrapping in parentheses when this expression
    /// binds looser than `min_prec`.
    fn operand_tokens(&self, min_prec: u8, dialect: Dialect) -> TokenStream {
        let inner = self.to_tokens_for_dialect(dialect);
        if self.precedence() >= min_prec {
            return inner;
        }
        let mut ts = TokenStream::new();
        ts.lparen().append(&inner).rparen();
        ts
    }
}

const PREC_RAW: u8 = 0;
const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_NOT: u8 = 3;
const PREC_COMPARISON: u8 = 4;
const PREC_ADDITIVE: u8 = 5;
const PREC_MULTIPLICATIVE: u8 = 6;
const PREC_NEGATE: u8 = 7;
const PREC_ATOM: u8 = u8::MAX;

impl BinaryOperator {
    fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Or => PREC_OR,
            BinaryOperator::And => PREC_AND,
            BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Lt
            | BinaryOperator::Gt
            | BinaryOperator::Lte
            | BinaryOperator::Gte
            | BinaryOperator::Like => PREC_COMPARISON,
            BinaryOperator::Plus | BinaryOperator::Minus => PREC_ADDITIVE,
            BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod => PREC_MULTIPLICATIVE,
        }
    }

    fn is_associative(self) -> bool {
        matches!(
            self,
            BinaryOperator::And | BinaryOperator::Or | BinaryOperator::Plus | BinaryOperator::Mul
        )
    }
}

fn binary_op_to_token(op: BinaryOperator) -> Token {
    match op {
        BinaryOperator::Eq => Token::Eq,
        BinaryOperator::Ne => Token::Ne,
        BinaryOperator::Lt => Token::Lt,
        BinaryOperator::Gt => Token::Gt,
        BinaryOperator::Lte => Token::Lte,
        BinaryOperator::Gte => Token::Gte,
        BinaryOperator::And => Token::And,
        BinaryOperator::Or => Token::Or,
        BinaryOperator::Plus => Token::Plus,
        BinaryOperator::Minus => Token::Minus,
        BinaryOperator::Mul => Token::Mul,
        BinaryOperator::Div => Token::Div,
        BinaryOperator::Mod => Token::Mod,
        BinaryOperator::Like => Token::Like,
    }
}

// =============================================================================
// Expression Constructors
// =============================================================================

/// Create a column reference.
pub fn col(name: &str) -> Expr {
    Expr::Column {
        table: None,
        column: name.into(),
    }
}

/// Create a qualified column reference (table.column).
pub fn table_col(table: &str, column: &str) -> Expr {
    Expr::Column {
        table: Some(table.into()),
        column: column.into(),
    }
}

/// Create an integer literal.
pub fn lit_int(n: i64) -> Expr {
    Expr::Literal(Literal::Int(n))
}

/// Create a float literal. Fails for NaN and infinities.
pub fn lit_float(f: f64) -> Result<Expr, NonFiniteFloat> {
    Ok(Expr::Literal(Literal::try_from(f)?))
}

/// Create a string literal.
pub fn lit_str(s: &str) -> Expr {
    Expr::Literal(Literal::String(s.into()))
}

/// Create a boolean literal.
pub fn lit_bool(b: bool) -> Expr {
    Expr::Literal(Literal::Bool(b))
}

/// Create a NULL literal.
pub fn lit_null() -> Expr {
    Expr::Literal(Literal::Null)
}

/// Create a bound parameter.
///
/// ```ignore
/// col("result").eq(param(2))   // "result" = $1   args: [2]
/// ```
pub fn param(value: impl Into<Literal>) -> Expr {
    Expr::Param(value.into())
}

/// Create a star (*) expression.
pub fn star() -> Expr {
    Expr::Star { table: None }
}

/// Create a qualified star (table.*) expression.
pub fn table_star(table: &str) -> Expr {
    Expr::Star {
        table: Some(table.into()),
    }
}

/// COUNT(expr)
pub fn count(expr: Expr) -> Expr {
    func("COUNT", vec![expr])
}

/// COUNT(*)
pub fn count_star() -> Expr {
    func("COUNT", vec![star()])
}

/// COUNT(DISTINCT expr)
pub fn count_distinct(expr: Expr) -> Expr {
    Expr::Function {
        name: "COUNT".into(),
        args: vec![expr],
        distinct: true,
    }
}

/// Generic function call.
pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function {
        name: name.into(),
        args,
        distinct: false,
    }
}

/// Raw SQL expression (pass-through, no parsing).
///
/// # Security Warning
///
/// **Never pass user input to this function.** The SQL is not sanitized.
pub fn raw_sql(sql: &str) -> Expr {
    Expr::Raw(sql.into())
}

// =============================================================================
// Expression Builder Trait
// =============================================================================

macro_rules! binary_method {
    ($(#[$meta:meta])* $name:ident, $op:ident) => {
        $(#[$meta])*
        fn $name(self, other: impl Into<Expr>) -> Expr {
            Expr::BinaryOp {
                left: Box::new(self.into_expr()),
                op: BinaryOperator::$op,
                right: Box::new(other.into()),
            }
        }
    };
}

/// Extension trait for building expressions fluently.
pub trait ExprExt: Sized {
    fn into_expr(self) -> Expr;

    binary_method!(eq, Eq);
    binary_method!(ne, Ne);
    binary_method!(gt, Gt);
    binary_method!(gte, Gte);
    binary_method!(lt, Lt);
    binary_method!(lte, Lte);
    binary_method!(and, And);
    binary_method!(or, Or);
    binary_method!(add, Plus);
    binary_method!(sub, Minus);
    binary_method!(mul, Mul);
    binary_method!(div, Div);
    binary_method!(like, Like);

    fn not(self) -> Expr {
        Expr::UnaryOp {
            op: UnaryOperator::Not,
            expr: Box::new(self.into_expr()),
        }
    }

    /// Wrap in explicit parentheses. Rendering already groups operands by precedence.
    fn paren(self) -> Expr {
        Expr::Paren(Box::new(self.into_expr()))
    }

    #[allow(clippy::wrong_self_convention)]
    fn is_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self.into_expr()),
            negated: false,
        }
    }

    #[allow(clippy::wrong_self_convention)]
    fn is_not_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self.into_expr()),
            negated: true,
        }
    }

    fn in_list(self, values: Vec<Expr>) -> Expr {
        Expr::In {
            expr: Box::new(self.into_expr()),
            values,
            negated: false,
        }
    }

    fn not_in_list(self, values: Vec<Expr>) -> Expr {
        Expr::In {
            expr: Box::new(self.into_expr()),
            values,
            negated: true,
        }
    }

    fn between(self, low: impl Into<Expr>, high: impl Into<Expr>) -> Expr {
        Expr::Between {
            expr: Box::new(self.into_expr()),
            low: Box::new(low.into()),
            high: Box::new(high.into()),
            negated: false,
        }
    }

    /// Alias this expression (for SELECT list).
    fn alias(self, name: &str) -> super::query::SelectExpr {
        super::query::SelectExpr {
            expr: self.into_expr(),
            alias: Some(name.into()),
        }
    }
}

impl ExprExt for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Int(n)
    }
}

impl From<i32> for Literal {
    fn from(n: i32) -> Self {
        Literal::Int(n as i64)
    }
}

impl TryFrom<f64> for Literal {
    type Error = NonFiniteFloat;

    fn try_from(f: f64) -> Result<Self, Self::Error> {
        FiniteFloat::try_from(f).map(Literal::Float)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.into())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl From<Literal> for Expr {
    fn from(lit: Literal) -> Self {
        Expr::Literal(lit)
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        lit_int(n)
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        lit_int(n as i64)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        lit_str(s)
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        lit_bool(b)
    }
}

impl From<super::query::Query> for Expr {
    fn from(query: super::query::Query) -> Self {
        Expr::Subquery(Box::new(query))
    }
}
