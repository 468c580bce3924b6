//! TOML-based configuration for approxcount.
//!
//! Supports a config file (approxcount.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [connections.warehouse]
//! driver = "postgres"
//! connection_string = "${WAREHOUSE_DSN}"
//!
//! [connections.orders]
//! driver = "mysql"
//! connection_string = "app:secret@tcp(localhost:3306)/orders"
//! default_schema = "sales"
//!
//! [worker]
//! path = "./approxcount-worker"
//! timeout_secs = 30
//!
//! [estimate]
//! surrogate_query = true
//! round = true
//! force_exact = false
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::estimate::EstimateOptions;
use crate::sql::dialect::Dialect;
use crate::sql::TableRef;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "APPROXCOUNT_CONFIG";

/// Worker binary name searched for when no path is configured.
const WORKER_BINARY: &str = "approxcount-worker";

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),

    #[error("Worker binary not found; set worker.path in config")]
    WorkerNotFound,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Named database connections.
    pub connections: HashMap<String, ConnectionSettings>,

    /// Worker configuration.
    pub worker: WorkerSettings,

    /// Defaults for row-count estimates.
    pub estimate: EstimateSettings,
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Database driver (postgres, pgx, mysql, mssql, duckdb, ...).
    pub driver: String,

    /// Connection string (supports ${ENV_VAR} expansion).
    pub connection_string: String,

    /// Default schema for this connection.
    #[serde(default)]
    pub default_schema: Option<String>,
}

impl ConnectionSettings {
    /// SQL dialect spoken by this connection's driver.
    pub fn dialect(&self) -> SettingsResult<Dialect> {
        Dialect::from_driver(&self.driver)
            .map_err(|_| SettingsError::UnsupportedDriver(self.driver.clone()))
    }

    /// Get the connection string with environment variables expanded.
    pub fn resolved_connection_string(&self) -> SettingsResult<String> {
        expand_env_vars(&self.connection_string)
    }

    /// Reference `table`, qualified by `schema` or else this connection's
    /// `default_schema`.
    pub fn table_ref(&self, table: &str, schema: Option<&str>) -> TableRef {
        let table_ref = TableRef::new(table);
        match schema.or(self.default_schema.as_deref()) {
            Some(schema) => table_ref.with_schema(schema),
            None => table_ref,
        }
    }
}

/// Worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Path to worker binary (supports ${ENV_VAR} expansion).
    pub path: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            path: None,
            timeout_secs: 30,
        }
    }
}

impl WorkerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Row-count estimate defaults.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct EstimateSettings {
    /// Explain a `SELECT 1` rewrite instead of the query as written.
    pub surrogate_query: bool,

    /// Round plan estimates to one significant digit.
    pub round: bool,

    /// Always run an exact `COUNT(*)`.
    pub force_exact: bool,
}

impl Default for EstimateSettings {
    fn default() -> Self {
        let options = EstimateOptions::default();
        Self {
            surrogate_query: options.surrogate_query,
            round: options.round,
            force_exact: options.force_exact,
        }
    }
}

impl From<EstimateSettings> for EstimateOptions {
    fn from(settings: EstimateSettings) -> Self {
        EstimateOptions {
            surrogate_query: settings.surrogate_query,
            round: settings.round,
            force_exact: settings.force_exact,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SettingsResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `APPROXCOUNT_CONFIG`
    /// 2. `./approxcount.toml`
    /// 3. `~/.config/approxcount/config.toml`
    pub fn load() -> SettingsResult<Self> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("approxcount.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("approxcount").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// Get a connection by name.
    pub fn get_connection(&self, name: &str) -> SettingsResult<&ConnectionSettings> {
        self.connections
            .get(name)
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))
    }

    /// Get the default connection ("default" if it exists, else the only one).
    pub fn default_connection(&self) -> Option<(&str, &ConnectionSettings)> {
        if let Some(conn) = self.connections.get("default") {
            return Some(("default", conn));
        }
        if self.connections.len() == 1 {
            return self.connections.iter().next().map(|(k, v)| (k.as_str(), v));
        }
        None
    }

    /// Get the worker binary path.
    ///
    /// Returns the configured path, or the first common location that exists.
    pub fn worker_path(&self) -> SettingsResult<PathBuf> {
        if let Some(path) = &self.worker.path {
            return Ok(PathBuf::from(expand_env_vars(path)?));
        }

        let candidates = [
            format!("./{}", WORKER_BINARY),
            format!("./worker/{}", WORKER_BINARY),
        ];
        for candidate in candidates {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Ok(path);
            }
        }

        // Try PATH
        if let Ok(output) = std::process::Command::new("which")
            .arg(WORKER_BINARY)
            .output()
        {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Ok(PathBuf::from(path));
                }
            }
        }

        Err(SettingsError::WorkerNotFound)
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> SettingsResult<String> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let name: String = std::iter::from_fn(|| chars.next_if(|ch| *ch != '}')).collect();
            chars.next(); // consume '}'
            name
        } else {
            std::iter::from_fn(|| chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_')).collect()
        };

        if var_name.is_empty() {
            // Just a lone $, keep it
            result.push('$');
            continue;
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
