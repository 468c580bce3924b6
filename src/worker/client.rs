//! Async client for communicating with the database worker process.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, warn};

use super::error::{WorkerError, WorkerResult};
use super::protocol::{
    methods, ConnectionParams, ErrorInfo, ExecuteQueryParams, ExecuteQueryResponse,
    RequestEnvelope, ResponseEnvelope,
};
use crate::config::Settings;

/// Default timeout for requests (30 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<ResponseEnvelope>>>>;

/// Async client for the database worker.
///
/// The client spawns the worker as a child process and communicates via
/// NDJSON (newline-delimited JSON) over stdin/stdout. Each request has a
/// unique ID for correlation with responses, enabling concurrent requests.
///
/// # Example
///
/// ```ignore
/// use approxcount::worker::WorkerClient;
///
/// let client = WorkerClient::spawn("./approxcount-worker").await?;
/// let response = client
///     .execute_query("postgres", "postgres://localhost/db", "SELECT 1", None)
///     .await?;
/// ```
pub struct WorkerClient {
    /// Writer for sending requests to worker stdin.
    stdin: Arc<Mutex<BufWriter<ChildStdin>>>,

    /// Map of pending request IDs to response channels.
    pending: PendingMap,

    /// Handle to the worker child process.
    _child: Child,

    /// Handle to the background reader task.
    reader_task: tokio::task::JoinHandle<()>,

    /// Request timeout duration.
    timeout: Duration,
}

impl WorkerClient {
    /// Spawn a new worker process.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker process cannot be spawned.
    pub async fn spawn<P: AsRef<Path>>(worker_path: P) -> WorkerResult<Self> {
        Self::spawn_with_timeout(worker_path, Duration::from_secs(DEFAULT_TIMEOUT_SECS)).await
    }

    /// Spawn a worker using the configured path and timeout.
    pub async fn spawn_with_settings(settings: &Settings) -> WorkerResult<Self> {
        let worker_path = settings.worker_path()?;
        Self::spawn_with_timeout(worker_path, settings.worker.timeout()).await
    }

    /// Spawn a new worker process with a custom timeout.
    pub async fn spawn_with_timeout<P: AsRef<Path>>(
        worker_path: P,
        timeout: Duration,
    ) -> WorkerResult<Self> {
        debug!(path = %worker_path.as_ref().display(), "spawning worker");

        let mut child = Command::new(worker_path.as_ref())
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(WorkerError::SpawnFailed)?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(WorkerError::StdioUnavailable);
        };

        let stdin = Arc::new(Mutex::new(BufWriter::new(stdin)));
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        // Spawn background reader task
        let reader_task = Self::spawn_reader_task(stdout, pending.clone());

        Ok(Self {
            stdin,
            pending,
            _child: child,
            reader_task,
            timeout,
        })
    }

    /// Spawn the background task that reads responses from the worker.
    fn spawn_reader_task(stdout: ChildStdout, pending: PendingMap) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => break,
                    Ok(_) => match serde_json::from_str::<ResponseEnvelope>(&line) {
                        Ok(resp) => {
                            let mut pending = pending.lock().await;
                            if let Some(tx) = pending.remove(&resp.id) {
                                let _ = tx.send(resp);
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "failed to parse worker response");
                        }
                    },
                    Err(e) => {
                        warn!(error = %e, "worker read error");
                        break;
                    }
                }
            }

            // Worker exited - notify all pending requests with error responses
            let mut pending = pending.lock().await;
            for (id, tx) in pending.drain() {
                let _ = tx.send(ResponseEnvelope {
                    id,
                    success: false,
                    result: None,
                    error: Some(ErrorInfo {
                        code: "WORKER_EXITED".to_string(),
                        message: "Worker process exited unexpectedly".to_string(),
                    }),
                });
            }
        })
    }

    /// Send a request to the worker and wait for a response.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Serialization fails
    /// - Writing to the worker fails
    /// - The request times out
    /// - The worker returns an error response
    /// - Deserialization of the response fails
    pub async fn request<P, R>(&self, method: &str, params: P) -> WorkerResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = uuid::Uuid::new_v4().to_string();
        let line = encode_request(&id, method, params)?;

        // Register response channel
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);

        if let Err(err) = self.write_line(&line).await {
            self.forget(&id).await;
            return Err(err);
        }

        let response = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(_)) => return Err(WorkerError::WorkerExited),
            Err(_) => {
                self.forget(&id).await;
                return Err(WorkerError::Timeout(self.timeout.as_secs()));
            }
        };

        decode_response(response)
    }

    async fn write_line(&self, line: &str) -> WorkerResult<()> {
        let mut stdin = self.stdin.lock().await;
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(WorkerError::WriteFailed)?;
        stdin.flush().await.map_err(WorkerError::WriteFailed)
    }

    /// Drop a pending entry that will never be answered.
    async fn forget(&self, id: &str) {
        self.pending.lock().await.remove(id);
    }

    /// Execute a SQL statement with optional positional arguments.
    pub async fn execute_query(
        &self,
        driver: &str,
        connection_string: &str,
        sql: &str,
        args: Option<Vec<serde_json::Value>>,
    ) -> WorkerResult<ExecuteQueryResponse> {
        self.request(
            methods::EXECUTE_QUERY,
            ExecuteQueryParams {
                connection: ConnectionParams::new(driver, connection_string),
                sql: sql.to_string(),
                args,
            },
        )
        .await
    }
}

impl Drop for WorkerClient {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

/// Serialize one NDJSON request line.
fn encode_request<P: Serialize>(id: &str, method: &str, params: P) -> WorkerResult<String> {
    let request = RequestEnvelope {
        id: id.to_string(),
        method: method.to_string(),
        params: serde_json::to_value(params).map_err(WorkerError::SerializeFailed)?,
    };
    let mut line = serde_json::to_string(&request).map_err(WorkerError::SerializeFailed)?;
    line.push('\n');
    Ok(line)
}

/// Turn a response envelope into the typed result or a classified error.
fn decode_response<R: DeserializeOwned>(response: ResponseEnvelope) -> WorkerResult<R> {
    if response.success {
        let result = response.result.unwrap_or(serde_json::Value::Null);
        serde_json::from_value(result).map_err(WorkerError::DeserializeFailed)
    } else {
        let error = response.error.unwrap_or_else(|| ErrorInfo {
            code: "UNKNOWN".to_string(),
            message: "Unknown error".to_string(),
        });
        Err(classify_error(&error.code, &error.message))
    }
}

/// Classify a worker error into a more specific error type.
fn classify_error(code: &str, message: &str) -> WorkerError {
    match code {
        "DRIVER_NOT_FOUND" => WorkerError::DriverNotFound(message.to_string()),
        "CONNECTION_FAILED" => WorkerError::ConnectionFailed(message.to_string()),
        "QUERY_FAILED" => WorkerError::QueryFailed(message.to_string()),
        "WORKER_EXITED" => WorkerError::WorkerExited,
        _ => WorkerError::Remote {
            code: code.to_string(),
            message: message.to_string(),
        },
    }
}
