//! WorkerExecutor implementation.
//!
//! Sends `query.execute` requests to the worker and converts the JSON
//! result cells into the shapes [`QueryExecutor`] promises.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::executor::{ExecError, ExecResult, QueryExecutor};
use crate::sql::expr::Literal;
use crate::worker::protocol::ConnectionParams;
use crate::worker::WorkerClient;

/// QueryExecutor backed by the database worker.
///
/// # Example
///
/// ```ignore
/// use approxcount::worker::WorkerClient;
/// use approxcount::exec::WorkerExecutor;
///
/// let client = WorkerClient::spawn("./approxcount-worker").await?;
/// let executor = WorkerExecutor::new(Arc::new(client), "postgres", dsn);
/// ```
pub struct WorkerExecutor {
    client: Arc<WorkerClient>,
    connection: ConnectionParams,
}

impl WorkerExecutor {
    /// Create a new WorkerExecutor.
    ///
    /// # Arguments
    ///
    /// * `client` - The worker client (shared reference).
    /// * `driver` - Database driver name (e.g., "postgres", "mysql").
    /// * `connection_string` - Driver-specific connection string.
    pub fn new(
        client: Arc<WorkerClient>,
        driver: impl Into<String>,
        connection_string: impl Into<String>,
    ) -> Self {
        Self {
            client,
            connection: ConnectionParams::new(driver, connection_string),
        }
    }

    /// Create a new WorkerExecutor with an owned client.
    pub fn with_client(
        client: WorkerClient,
        driver: impl Into<String>,
        connection_string: impl Into<String>,
    ) -> Self {
        Self::new(Arc::new(client), driver, connection_string)
    }

    pub fn driver(&self) -> &str {
        &self.connection.driver
    }

    async fn run(&self, sql: &str, args: &[Literal]) -> ExecResult<Vec<Vec<Value>>> {
        let args = if args.is_empty() {
            None
        } else {
            Some(args.iter().map(Literal::to_json).collect())
        };

        let response = self
            .client
            .execute_query(
                &self.connection.driver,
                &self.connection.connection_string,
                sql,
                args,
            )
            .await?;

        Ok(response.rows)
    }
}

#[async_trait]
impl QueryExecutor for WorkerExecutor {
    async fn execute_scalar_query(&self, sql: &str, args: &[Literal]) -> ExecResult<i64> {
        let rows = self.run(sql, args).await?;
        scalar_from_rows(&rows)
    }

    async fn execute_row_query(&self, sql: &str, args: &[Literal]) -> ExecResult<Vec<String>> {
        let rows = self.run(sql, args).await?;
        Ok(first_column_text(&rows))
    }
}

/// Read the integer in the first cell of the first row.
///
/// Accepts JSON integers, floats with no fractional part and numeric
/// strings (drivers return `bigint`/`numeric` counts in all three forms).
pub fn scalar_from_rows(rows: &[Vec<Value>]) -> ExecResult<i64> {
    let cell = rows
        .first()
        .and_then(|row| row.first())
        .ok_or(ExecError::NoRows)?;

    let unexpected = || ExecError::UnexpectedValue(cell.to_string());

    match cell {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                        Ok(f as i64)
                    }
                    _ => Err(unexpected()),
                }
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| unexpected()),
        _ => Err(unexpected()),
    }
}

/// First column of every row as text, in order.
///
/// SQL NULLs and empty rows are skipped; numbers and booleans are rendered
/// with their JSON text.
pub fn first_column_text(rows: &[Vec<Value>]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| match row.first()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
        .collect()
}
