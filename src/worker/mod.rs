//! Worker communication module.
//!
//! This module provides async communication with the database worker process.
//! The worker owns the database drivers and connections; this crate only
//! renders SQL and interprets results.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  approxcount (Rust + Tokio)                     │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │                    WorkerClient (Async)                   │  │
//! │  │  - Spawns the worker as child process                     │  │
//! │  │  - NDJSON protocol over stdin/stdout                      │  │
//! │  │  - Request IDs for concurrent request correlation         │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                              │                                   │
//! │               stdin (NDJSON) │ stdout (NDJSON)                  │
//! │                              ▼                                   │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//!                                ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              Database Worker (Long-Running Child Process)       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use approxcount::worker::WorkerClient;
//!
//! let client = WorkerClient::spawn("./approxcount-worker").await?;
//! let plan = client
//!     .execute_query("postgres", dsn, "EXPLAIN SELECT 1 FROM audit", None)
//!     .await?;
//!
//! // Client is automatically shut down on drop
//! ```

mod client;
mod error;
pub mod protocol;

pub use client::WorkerClient;
pub use error::{WorkerError, WorkerResult};
