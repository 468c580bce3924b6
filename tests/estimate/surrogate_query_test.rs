// tests/estimate/surrogate_query_test.rs
//
// Probe statements per dialect, checked by snapshot and by parsing them back
// with sqlparser.

use approxcount::estimate::{EstimateOptions, Probe, Strategy};
use approxcount::sql::{
    col, count_star, lit_int, param, table_col, Dialect, ExprExt, OrderByExpr, Query, TableRef,
};
use insta::assert_snapshot;
use sqlparser::dialect::{MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

fn audit_by_result() -> Query {
    Query::new()
        .select(vec![col("id"), col("actor")])
        .from(TableRef::new("audit").with_schema("public"))
        .filter(col("result").eq(param(2)))
        .filter(col("type").eq(param("Runtime")))
        .order_by(vec![OrderByExpr::desc(col("createtime"))])
}

fn assert_parses_postgres(sql: &str) {
    Parser::parse_sql(&PostgreSqlDialect {}, sql)
        .unwrap_or_else(|e| panic!("invalid SQL: {}\n{}", e, sql));
}

#[test]
fn test_postgres_surrogate_probe() {
    let probe = Probe::build(&audit_by_result(), Dialect::Postgres, EstimateOptions::default());

    assert_eq!(probe.strategy, Strategy::PlanEstimate);
    assert_snapshot!(probe.sql, @r#"
    EXPLAIN SELECT
      1
    FROM "public"."audit"
    WHERE "result" = $1 AND "type" = $2
    "#);
    assert_parses_postgres(&probe.sql);
}

#[test]
fn test_postgres_verbatim_probe_keeps_projection_and_order() {
    let options = EstimateOptions::new(false, true);
    let probe = Probe::build(&audit_by_result(), Dialect::Postgres, options);

    assert_snapshot!(probe.sql, @r#"
    EXPLAIN SELECT
      "id",
      "actor"
    FROM "public"."audit"
    WHERE "result" = $1 AND "type" = $2
    ORDER BY "createtime" DESC
    "#);
    assert_parses_postgres(&probe.sql);
}

#[test]
fn test_args_follow_placeholder_order() {
    let probe = Probe::build(&audit_by_result(), Dialect::Redshift, EstimateOptions::default());
    assert_eq!(
        probe.args,
        vec![
            approxcount::sql::Literal::Int(2),
            approxcount::sql::Literal::String("Runtime".into())
        ]
    );
}

#[test]
fn test_surrogate_keeps_joins() {
    let query = Query::new()
        .select(vec![table_col("a", "id"), table_col("h", "name")])
        .from(TableRef::new("audit").with_alias("a"))
        .inner_join(
            TableRef::new("hosts").with_alias("h"),
            table_col("a", "hostid").eq(table_col("h", "id")),
        )
        .filter(table_col("h", "active").eq(lit_int(1)));

    let probe = Probe::build(&query, Dialect::Postgres, EstimateOptions::default());
    assert_snapshot!(probe.sql, @r#"
    EXPLAIN SELECT
      1
    FROM "audit" AS "a"
    INNER JOIN "hosts" AS "h" ON "a"."hostid" = "h"."id"
    WHERE "h"."active" = 1
    "#);
    assert_parses_postgres(&probe.sql);
}

#[test]
fn test_surrogate_keeps_grouping() {
    let query = Query::new()
        .select(vec![col("account_id"), count_star()])
        .from("audit")
        .group_by(vec![col("account_id")])
        .having(count_star().gt(lit_int(10)));

    let probe = Probe::build(&query, Dialect::Postgres, EstimateOptions::default());
    assert_snapshot!(probe.sql, @r#"
    EXPLAIN SELECT
      1
    FROM "audit"
    GROUP BY "account_id"
    HAVING COUNT(*) > 10
    "#);
    assert_parses_postgres(&probe.sql);
}

#[test]
fn test_mysql_count_drops_order_by() {
    let probe = Probe::build(&audit_by_result(), Dialect::MySql, EstimateOptions::default());

    assert_eq!(probe.strategy, Strategy::ExactCount);
    assert_snapshot!(probe.sql, @r"
    SELECT
      COUNT(*)
    FROM `public`.`audit`
    WHERE `result` = ? AND `type` = ?
    ");
    Parser::parse_sql(&MySqlDialect {}, &probe.sql).unwrap();
}

#[test]
fn test_paged_count_wraps_query() {
    let query = Query::new()
        .select(vec![col("id")])
        .from("audit")
        .order_by(vec![OrderByExpr::asc(col("id"))])
        .limit(100);

    let probe = Probe::build(&query, Dialect::Postgres, EstimateOptions::exact());
    assert_snapshot!(probe.sql, @r#"
    SELECT
      COUNT(*)
    FROM (SELECT
      "id"
    FROM "audit"
    ORDER BY "id" ASC
    LIMIT 100) AS "counted"
    "#);
    assert_parses_postgres(&probe.sql);
}

#[test]
fn test_tsql_count_uses_named_parameters() {
    let probe = Probe::build(&audit_by_result(), Dialect::TSql, EstimateOptions::default());

    assert_eq!(probe.strategy, Strategy::ExactCount);
    assert!(probe.sql.contains("[public].[audit]"));
    assert!(probe.sql.contains("[result] = @p1 AND [type] = @p2"));
}
