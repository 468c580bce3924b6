// tests/exec/worker_executor_test.rs
//
// Conversion of worker `query.execute` results into executor values.

use approxcount::estimate::parse_plan_rows;
use approxcount::exec::{first_column_text, scalar_from_rows, ExecError};
use approxcount::worker::protocol::ExecuteQueryResponse;
use serde_json::{json, Value};

fn response(body: Value) -> ExecuteQueryResponse {
    serde_json::from_value(body).unwrap()
}

#[test]
fn test_count_as_integer() {
    let resp = response(json!({
        "columns": [{"name": "count", "data_type": "INT8"}],
        "rows": [[549]],
        "row_count": 1
    }));
    assert_eq!(scalar_from_rows(&resp.rows).unwrap(), 549);
}

#[test]
fn test_count_as_numeric_string() {
    // NUMERIC and some BIGINT drivers come back as text
    let rows = vec![vec![json!("28603180")]];
    assert_eq!(scalar_from_rows(&rows).unwrap(), 28_603_180);

    let rows = vec![vec![json!(" 42 ")]];
    assert_eq!(scalar_from_rows(&rows).unwrap(), 42);
}

#[test]
fn test_count_as_integral_float() {
    let rows = vec![vec![json!(1200.0)]];
    assert_eq!(scalar_from_rows(&rows).unwrap(), 1200);
}

#[test]
fn test_fractional_count_is_rejected() {
    let rows = vec![vec![json!(12.5)]];
    assert!(matches!(
        scalar_from_rows(&rows),
        Err(ExecError::UnexpectedValue(v)) if v == "12.5"
    ));
}

#[test]
fn test_text_count_is_rejected() {
    let rows = vec![vec![json!("many")]];
    assert!(matches!(
        scalar_from_rows(&rows),
        Err(ExecError::UnexpectedValue(_))
    ));
}

#[test]
fn test_count_without_rows() {
    let resp = response(json!({"columns": [], "rows": [], "row_count": 0}));
    assert!(matches!(scalar_from_rows(&resp.rows), Err(ExecError::NoRows)));

    let rows: Vec<Vec<Value>> = vec![vec![]];
    assert!(matches!(scalar_from_rows(&rows), Err(ExecError::NoRows)));
}

#[test]
fn test_plan_rows_take_first_column() {
    let resp = response(json!({
        "columns": [{"name": "QUERY PLAN", "data_type": "TEXT"}],
        "rows": [
            ["Gather  (cost=1000.00..5626512.75 rows=14536136 width=1395)"],
            ["  Workers Planned: 2"],
            ["  ->  Parallel Seq Scan on audit  (cost=0.00..4171899.15 rows=6056723 width=1395)"]
        ],
        "row_count": 3
    }));

    let lines = first_column_text(&resp.rows);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "  Workers Planned: 2");
    assert_eq!(parse_plan_rows(&lines).unwrap(), 14_536_136);
}

#[test]
fn test_plan_rows_skip_nulls_and_stringify() {
    let rows = vec![
        vec![Value::Null],
        vec![],
        vec![json!(7), json!("second column")],
        vec![json!(true)],
        vec![json!("text")],
    ];
    assert_eq!(first_column_text(&rows), vec!["7", "true", "text"]);
}

#[test]
fn test_plan_as_single_text_value() {
    let rows = vec![vec![json!(
        "Seq Scan on audit  (cost=0.00..1.00 rows=900 width=4)\n  Filter: (result = 2)"
    )]];
    let lines = first_column_text(&rows);
    assert_eq!(parse_plan_rows(&lines).unwrap(), 900);
}
