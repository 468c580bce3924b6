//! Protocol types for worker communication.
//!
//! Requests and responses are single-line JSON objects (NDJSON). Every
//! request carries an `id` that the worker echoes back, so several requests
//! may be in flight at once.

use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Envelope
// ============================================================================

/// Request envelope sent to the worker.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    /// Unique request ID for correlation.
    pub id: String,
    /// Method name (e.g., "query.execute").
    pub method: String,
    /// Method-specific parameters.
    pub params: serde_json::Value,
}

/// Response envelope received from the worker.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    /// Request ID this response corresponds to.
    pub id: String,
    /// Whether the request succeeded.
    pub success: bool,
    /// Result data (present if success = true).
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error information (present if success = false).
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

/// Error information in a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

// ============================================================================
// Connection Parameters (included in all requests)
// ============================================================================

/// Database connection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Database driver name (e.g., "postgres", "mysql").
    pub driver: String,
    /// Driver-specific connection string.
    pub connection_string: String,
}

impl ConnectionParams {
    pub fn new(driver: impl Into<String>, connection_string: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            connection_string: connection_string.into(),
        }
    }
}

// ============================================================================
// Query Execution
// ============================================================================

/// Parameters for `query.execute`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteQueryParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
    /// SQL query to execute.
    pub sql: String,
    /// Positional bind arguments, in placeholder order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<serde_json::Value>>,
}

/// Column information in query results.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResultColumn {
    /// Column name or alias.
    pub name: String,
    /// Database-specific type.
    #[serde(default)]
    pub data_type: String,
}

/// Response from `query.execute`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteQueryResponse {
    /// Result column descriptions.
    #[serde(default)]
    pub columns: Vec<QueryResultColumn>,
    /// Result data rows.
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
    /// Number of rows returned.
    #[serde(default)]
    pub row_count: i64,
    /// Rows affected (for INSERT/UPDATE/DELETE).
    #[serde(default)]
    pub rows_affected: Option<i64>,
}

// ============================================================================
// Method Names
// ============================================================================

/// Worker method names.
pub mod methods {
    pub const EXECUTE_QUERY: &str = "query.execute";
}
