// tests/estimate/estimated_count_test.rs
//
// Drives `SelectStmt::estimated_count` through a scripted executor: each
// expectation names the call kind, the SQL prefix it must start with, and
// the canned result.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use approxcount::db::Database;
use approxcount::estimate::{EstimateError, EstimateOptions};
use approxcount::exec::{ExecError, ExecResult, QueryExecutor};
use approxcount::sql::{col, param, Dialect, ExprExt, Literal};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Call {
    Scalar,
    Rows,
}

enum Reply {
    Scalar(i64),
    Rows(Vec<String>),
    Error(String),
}

struct Expectation {
    call: Call,
    sql_prefix: String,
    args: Option<Vec<Literal>>,
    reply: Reply,
}

/// Executor that replays expectations in order and panics on anything else.
#[derive(Default)]
struct MockExecutor {
    expected: Mutex<VecDeque<Expectation>>,
}

impl MockExecutor {
    fn expect(&self, call: Call, sql_prefix: &str, reply: Reply) -> &Self {
        self.expected.lock().unwrap().push_back(Expectation {
            call,
            sql_prefix: sql_prefix.to_string(),
            args: None,
            reply,
        });
        self
    }

    fn with_args(&self, args: Vec<Literal>) -> &Self {
        if let Some(last) = self.expected.lock().unwrap().back_mut() {
            last.args = Some(args);
        }
        self
    }

    fn expect_rows(&self, sql_prefix: &str, rows: &[&str]) -> &Self {
        let rows = rows.iter().map(|r| r.to_string()).collect();
        self.expect(Call::Rows, sql_prefix, Reply::Rows(rows))
    }

    fn expect_scalar(&self, sql_prefix: &str, value: i64) -> &Self {
        self.expect(Call::Scalar, sql_prefix, Reply::Scalar(value))
    }

    fn expect_error(&self, call: Call, sql_prefix: &str, message: &str) -> &Self {
        self.expect(call, sql_prefix, Reply::Error(message.to_string()))
    }

    fn assert_expectations_met(&self) {
        let remaining = self.expected.lock().unwrap().len();
        assert_eq!(remaining, 0, "{} expected queries were never run", remaining);
    }

    fn next(&self, call: Call, sql: &str, args: &[Literal]) -> Reply {
        let expectation = self
            .expected
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected {:?} query: {}", call, sql));

        assert_eq!(expectation.call, call, "wrong call kind for: {}", sql);
        let actual = normalize(sql);
        let prefix = normalize(&expectation.sql_prefix);
        assert!(
            actual.to_lowercase().starts_with(&prefix.to_lowercase()),
            "query {:?} does not start with {:?}",
            actual,
            prefix
        );
        if let Some(expected_args) = &expectation.args {
            assert_eq!(args, expected_args.as_slice());
        }
        expectation.reply
    }
}

fn normalize(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl QueryExecutor for MockExecutor {
    async fn execute_scalar_query(&self, sql: &str, args: &[Literal]) -> ExecResult<i64> {
        match self.next(Call::Scalar, sql, args) {
            Reply::Scalar(n) => Ok(n),
            Reply::Error(msg) => Err(ExecError::Backend(msg)),
            Reply::Rows(_) => panic!("scalar query scripted with rows"),
        }
    }

    async fn execute_row_query(&self, sql: &str, args: &[Literal]) -> ExecResult<Vec<String>> {
        match self.next(Call::Rows, sql, args) {
            Reply::Rows(rows) => Ok(rows),
            Reply::Error(msg) => Err(ExecError::Backend(msg)),
            Reply::Scalar(_) => panic!("row query scripted with a scalar"),
        }
    }
}

fn database(driver: &str) -> (Arc<MockExecutor>, Database) {
    let mock = Arc::new(MockExecutor::default());
    let dialect = Dialect::from_driver(driver).unwrap();
    let db = Database::new(mock.clone(), dialect);
    (mock, db)
}

const INDEX_ONLY_SCAN: &str = "Index Only Scan using audit_date_trunc_day_idx on audit  (cost=0.56..827577.76 rows=28603180 width=4)";

const GROUPED_PLAN: [&str; 10] = [
    "Finalize GroupAggregate  (cost=5540869.61..5551244.43 rows=64841 width=24)",
    "   Group Key: (date_trunc('day'::text, to_timestamp((createtime)::double precision)))",
    "   ->  Gather Merge  (cost=5540869.61..5549611.77 rows=66392 width=24)",
    "         Workers Planned: 2",
    "         ->  Partial GroupAggregate  (cost=5539869.59..5540948.46 rows=33196 width=24)",
    "               Group Key: (date_trunc('day'::text, to_timestamp((createtime)::double precision)))",
    "               ->  Sort  (cost=5539869.59..5539952.58 rows=33196 width=12)",
    "                     Sort Key: (date_trunc('day'::text, to_timestamp((createtime)::double precision)))",
    "                     ->  Parallel Seq Scan on audit a  (cost=0.00..5537376.78 rows=33196 width=12)",
    "                          Filter: ((result = ANY ('{2,3}'::integer[])) AND ((containerid)::text <> ''::text))",
];

/// The grouped plan with every `rows=` token removed.
fn plan_without_estimates() -> Vec<String> {
    GROUPED_PLAN
        .iter()
        .map(|line| {
            line.split(' ')
                .filter(|tok| !tok.starts_with("rows="))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

#[tokio::test]
async fn test_surrogate_query_rounded() {
    let (mock, db) = database("postgres");
    mock.expect_rows("EXPLAIN SELECT 1", &[INDEX_ONLY_SCAN]);

    let count = db.select_star().from("audit").estimated_count(true, true).await;

    assert_eq!(count.unwrap(), 20_000_000);
    mock.assert_expectations_met();
}

#[tokio::test]
async fn test_regular_query_with_bound_filter() {
    let (mock, db) = database("pgx");
    mock.expect_rows(
        r#"EXPLAIN SELECT * FROM "audit" WHERE "result" = $1"#,
        &["Seq Scan on audit  (cost=0.00..5626512.75 rows=14536136 width=1395)"],
    )
    .with_args(vec![Literal::Int(2)]);

    let count = db
        .select_star()
        .from("audit")
        .filter(col("result").eq(param(2)))
        .estimated_count(false, true)
        .await;

    assert_eq!(count.unwrap(), 10_000_000);
    mock.assert_expectations_met();
}

#[tokio::test]
async fn test_unsupported_engine_counts_exactly() {
    let (mock, db) = database("mysql");
    mock.expect_scalar("SELECT COUNT(*) FROM `audit` WHERE `result` = ?", 549)
        .with_args(vec![Literal::Int(4)]);

    let count = db
        .select(vec![col("id")])
        .from("audit")
        .filter(col("result").eq(param(4)))
        .estimated_count(true, true)
        .await;

    // Exact counts are never rounded
    assert_eq!(count.unwrap(), 549);
    mock.assert_expectations_met();
}

#[tokio::test]
async fn test_count_keeps_or_group_from_chained_filters() {
    let (mock, db) = database("mysql");
    mock.expect_scalar(
        "SELECT COUNT(*) FROM `audit` WHERE (`result` = ? OR `result` = ?) AND `host` = ?",
        3,
    )
    .with_args(vec![Literal::Int(2), Literal::Int(3), Literal::Int(7)]);

    let count = db
        .select_star()
        .from("audit")
        .filter(col("result").eq(param(2)).or(col("result").eq(param(3))))
        .filter(col("host").eq(param(7)))
        .estimated_count(true, true)
        .await;

    assert_eq!(count.unwrap(), 3);
    mock.assert_expectations_met();
}

#[tokio::test]
async fn test_plan_estimate_keeps_or_group_from_chained_filters() {
    let (mock, db) = database("postgres");
    mock.expect_rows(
        r#"EXPLAIN SELECT 1 FROM "audit" WHERE ("result" = $1 OR "result" = $2) AND "host" = $3"#,
        &[INDEX_ONLY_SCAN],
    )
    .with_args(vec![Literal::Int(2), Literal::Int(3), Literal::Int(7)]);

    let count = db
        .select_star()
        .from("audit")
        .filter(col("result").eq(param(2)).or(col("result").eq(param(3))))
        .filter(col("host").eq(param(7)))
        .estimated_count(true, true)
        .await;

    assert!(count.is_ok());
    mock.assert_expectations_met();
}

#[tokio::test]
async fn test_unsupported_engines_ignore_flags() {
    for driver in ["mysql", "mssql", "duckdb", "snowflake", "bigquery", "databricks"] {
        for (surrogate, round) in [(true, true), (true, false), (false, true), (false, false)] {
            let (mock, db) = database(driver);
            mock.expect_scalar("SELECT COUNT(*)", 12_345);

            let count = db
                .select(vec![col("id")])
                .from("audit")
                .estimated_count(surrogate, round)
                .await;

            assert_eq!(count.unwrap(), 12_345, "{}", driver);
            mock.assert_expectations_met();
        }
    }
}

#[tokio::test]
async fn test_without_rounding() {
    let (mock, db) = database("postgres");
    mock.expect_rows(r#"EXPLAIN SELECT "id""#, &[INDEX_ONLY_SCAN]);

    let count = db
        .select(vec![col("id")])
        .from("audit")
        .estimated_count(false, false)
        .await;

    assert_eq!(count.unwrap(), 28_603_180);
    mock.assert_expectations_met();
}

#[tokio::test]
async fn test_first_row_of_multi_row_plan() {
    let (mock, db) = database("postgres");
    mock.expect_rows("EXPLAIN SELECT 1", &GROUPED_PLAN);

    let count = db
        .select(vec![col("id")])
        .from("audit")
        .estimated_count(true, true)
        .await;

    assert_eq!(count.unwrap(), 60_000);
    mock.assert_expectations_met();
}

#[tokio::test]
async fn test_estimate_on_third_row() {
    let (mock, db) = database("postgres");
    let mut plan: Vec<String> = GROUPED_PLAN.iter().map(|s| s.to_string()).collect();
    plan[0] = "Finalize GroupAggregate  (cost=5540869.61..5551244.43 width=24)".to_string();
    let rows: Vec<&str> = plan.iter().map(String::as_str).collect();
    mock.expect_rows("EXPLAIN SELECT 1", &rows);

    let count = db
        .select(vec![col("id")])
        .from("audit")
        .estimated_count(true, true)
        .await;

    assert_eq!(count.unwrap(), 60_000);
    mock.assert_expectations_met();
}

#[tokio::test]
async fn test_plan_without_estimates_is_an_error() {
    let (mock, db) = database("postgres");
    let plan = plan_without_estimates();
    let rows: Vec<&str> = plan.iter().map(String::as_str).collect();
    mock.expect_rows("EXPLAIN SELECT 1", &rows);

    let result = db
        .select(vec![col("id")])
        .from("audit")
        .estimated_count(true, true)
        .await;

    assert!(matches!(result, Err(EstimateError::NoEstimateFound)));
    mock.assert_expectations_met();
}

#[tokio::test]
async fn test_empty_plan_is_an_error() {
    let (mock, db) = database("postgres");
    mock.expect_rows("EXPLAIN SELECT 1", &[]);

    let result = db
        .select(vec![col("id")])
        .from("audit")
        .estimated_count(true, true)
        .await;

    let err = result.unwrap_err();
    assert!(err.is_parse());
    assert!(!err.is_execution());
    mock.assert_expectations_met();
}

#[tokio::test]
async fn test_malformed_estimate_is_an_error() {
    let (mock, db) = database("redshift");
    mock.expect_rows(
        "EXPLAIN SELECT 1",
        &["XN Seq Scan on audit  (cost=0.00..1.00 rows=lots width=4)"],
    );

    let result = db.select_star().from("audit").estimated_count(true, true).await;

    match result {
        Err(EstimateError::MalformedEstimate { value, line }) => {
            assert_eq!(value, "lots");
            assert!(line.starts_with("XN Seq Scan"));
        }
        other => panic!("expected MalformedEstimate, got {:?}", other),
    }
    mock.assert_expectations_met();
}

#[tokio::test]
async fn test_probe_error_is_an_error() {
    let (mock, db) = database("postgres");
    mock.expect_error(Call::Rows, r#"EXPLAIN SELECT "id""#, "sql: no rows in result set");

    let result = db
        .select(vec![col("id")])
        .from("audit")
        .estimated_count(false, false)
        .await;

    let err = result.unwrap_err();
    assert!(err.is_execution());
    assert!(err.to_string().contains("no rows in result set"));
    mock.assert_expectations_met();
}

#[tokio::test]
async fn test_count_error_is_an_error() {
    let (mock, db) = database("mysql");
    mock.expect_error(Call::Scalar, "SELECT COUNT(*)", "connection reset");

    let result = db.select_star().from("audit").estimated_count(true, true).await;

    assert!(matches!(
        result,
        Err(EstimateError::ExecutionFailed(ExecError::Backend(_)))
    ));
    mock.assert_expectations_met();
}

#[tokio::test]
async fn test_negative_count_is_rejected() {
    let (mock, db) = database("mysql");
    mock.expect_scalar("SELECT COUNT(*)", -1);

    let result = db.select_star().from("audit").estimated_count(true, true).await;

    assert!(matches!(
        result,
        Err(EstimateError::ExecutionFailed(ExecError::UnexpectedValue(_)))
    ));
}

#[tokio::test]
async fn test_exact_count_on_plan_engine() {
    let (mock, db) = database("postgres");
    mock.expect_scalar(r#"SELECT COUNT(*) FROM "audit""#, 28_603_180);

    let count = db.select_star().from("audit").exact_count().await;

    assert_eq!(count.unwrap(), 28_603_180);
    mock.assert_expectations_met();
}

#[tokio::test]
async fn test_force_exact_option() {
    let (mock, db) = database("redshift");
    mock.expect_scalar("SELECT COUNT(*)", 77);

    let count = db
        .select_star()
        .from("audit")
        .estimated_count_with(EstimateOptions::exact())
        .await;

    assert_eq!(count.unwrap(), 77);
    mock.assert_expectations_met();
}

#[tokio::test]
async fn test_distinct_count_wraps_query() {
    let (mock, db) = database("mysql");
    mock.expect_scalar(
        "SELECT COUNT(*) FROM (SELECT DISTINCT `actor` FROM `audit`) AS `counted`",
        3,
    );

    let count = db
        .select(vec![col("actor")])
        .distinct()
        .from("audit")
        .estimated_count(true, true)
        .await;

    assert_eq!(count.unwrap(), 3);
    mock.assert_expectations_met();
}

#[tokio::test]
async fn test_one_query_per_call() {
    let (mock, db) = database("postgres");
    mock.expect_rows("EXPLAIN SELECT 1", &[INDEX_ONLY_SCAN])
        .expect_rows("EXPLAIN SELECT 1", &["Seq Scan on audit  (cost=0.00..1.00 rows=5 width=4)"]);

    let stmt = db.select_star().from("audit");
    assert_eq!(stmt.estimated_count(true, true).await.unwrap(), 20_000_000);
    assert_eq!(stmt.estimated_count(true, true).await.unwrap(), 5);
    mock.assert_expectations_met();
}
