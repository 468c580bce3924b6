//! Planner output scanning.
//!
//! Text `EXPLAIN` output from Postgres-family planners annotates each plan
//! node with its cost and cardinality:
//!
//! ```text
//! Gather  (cost=1000.00..5626512.75 rows=14536136 width=1395)
//!   Workers Planned: 2
//!   ->  Parallel Seq Scan on audit  (cost=0.00..4171899.15 rows=6056723 width=1395)
//!         Filter: (result = 2)
//! ```
//!
//! The estimate for the whole statement is the one on the first annotated
//! line (the root node). Nothing else about the plan is interpreted.

use std::sync::LazyLock;

use regex::Regex;

use super::error::{EstimateError, EstimateResult};

/// `rows=` at a word boundary, capturing everything up to whitespace or `)`.
static ROWS_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\brows=([^\s)]*)").expect("valid regex"));

/// Extract the row estimate from the first plan line that carries one.
///
/// Each item may hold several lines (some drivers return the whole plan as a
/// single text value); lines are scanned in order and the scan stops at the
/// first `rows=` token.
pub fn parse_plan_rows<I, S>(rows: I) -> EstimateResult<u64>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for row in rows {
        for line in row.as_ref().lines() {
            if let Some(estimate) = parse_plan_line(line) {
                return estimate;
            }
        }
    }
    Err(EstimateError::NoEstimateFound)
}

/// Read the `rows=` token of a single line, if it has one.
///
/// Returns `None` when the line carries no token, so the caller keeps
/// scanning.
pub fn parse_plan_line(line: &str) -> Option<EstimateResult<u64>> {
    let caps = ROWS_TOKEN.captures(line)?;
    let value = caps.get(1).map(|m| m.as_str()).unwrap_or_default();

    let parsed = if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        value.parse::<u64>().ok()
    } else {
        None
    };

    Some(parsed.ok_or_else(|| EstimateError::MalformedEstimate {
        value: value.to_string(),
        line: line.to_string(),
    }))
}
