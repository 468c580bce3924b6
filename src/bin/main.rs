//! approxcount CLI - approximate row counts from query-planner estimates
//!
//! Usage:
//!   approxcount count --connection <name> --table <table> [--filter <sql>]
//!   approxcount explain --dialect <dialect> --table <table> [--filter <sql>]
//!
//! Examples:
//!   approxcount count --connection warehouse --table audit --filter "result = 2"
//!   approxcount count --connection orders --table orders --exact
//!   approxcount explain --dialect postgres --schema public --table audit

use approxcount::config::{ConnectionSettings, Settings, SettingsError};
use approxcount::db::Database;
use approxcount::estimate::{EstimateOptions, Probe, Strategy};
use approxcount::exec::WorkerExecutor;
use approxcount::sql::{raw_sql, Dialect, Query, TableRef};
use approxcount::worker::WorkerClient;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;

#[derive(Parser)]
#[command(name = "approxcount")]
#[command(about = "approxcount - fast approximate row counts from query-planner estimates")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count rows of a table through a configured connection
    Count {
        /// Connection name from the config file (defaults to "default")
        #[arg(short, long)]
        connection: Option<String>,

        #[command(flatten)]
        target: TargetArgs,

        /// Run an exact COUNT(*) even where plan estimates are available
        #[arg(long)]
        exact: bool,

        #[command(flatten)]
        probe: ProbeArgs,

        /// Do not round plan estimates
        #[arg(long)]
        no_round: bool,

        /// Config file (overrides APPROXCOUNT_CONFIG and default locations)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the statement a count would send, without connecting
    Explain {
        /// SQL dialect to generate
        #[arg(short, long, default_value = "postgres")]
        dialect: DialectArg,

        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        probe: ProbeArgs,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Table to count
    #[arg(short, long)]
    table: String,

    /// Schema of the table
    #[arg(short, long)]
    schema: Option<String>,

    /// Raw SQL predicate for the WHERE clause
    #[arg(short, long)]
    filter: Option<String>,
}

impl TargetArgs {
    /// Table named on the command line, falling back to the connection's default schema.
    fn table_ref(&self, conn: &ConnectionSettings) -> TableRef {
        conn.table_ref(&self.table, self.schema.as_deref())
    }

    fn plain_table_ref(&self) -> TableRef {
        let table = TableRef::new(&self.table);
        match &self.schema {
            Some(schema) => table.with_schema(schema),
            None => table,
        }
    }

    fn query(&self, table: TableRef) -> Query {
        let query = Query::new().select_star().from(table);
        match &self.filter {
            Some(predicate) => query.filter(raw_sql(predicate)),
            None => query,
        }
    }
}

#[derive(Args)]
struct ProbeArgs {
    /// Explain the query as written instead of a SELECT 1 rewrite
    #[arg(long)]
    no_surrogate: bool,
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Postgres,
    Mysql,
    Tsql,
    Duckdb,
    Bigquery,
    Snowflake,
    Databricks,
    Redshift,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Mysql => Dialect::MySql,
            DialectArg::Tsql => Dialect::TSql,
            DialectArg::Duckdb => Dialect::DuckDb,
            DialectArg::Bigquery => Dialect::BigQuery,
            DialectArg::Snowflake => Dialect::Snowflake,
            DialectArg::Databricks => Dialect::Databricks,
            DialectArg::Redshift => Dialect::Redshift,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Count {
            connection,
            target,
            exact,
            probe,
            no_round,
            config,
        } => {
            let overrides = Overrides {
                exact,
                no_surrogate: probe.no_surrogate,
                no_round,
            };
            cmd_count(connection, target, overrides, config).await
        }
        Commands::Explain {
            dialect,
            target,
            probe,
        } => cmd_explain(dialect.into(), target, probe),
    }
}

/// Command-line switches layered over the `[estimate]` settings.
struct Overrides {
    exact: bool,
    no_surrogate: bool,
    no_round: bool,
}

impl Overrides {
    fn apply(&self, mut options: EstimateOptions) -> EstimateOptions {
        if self.exact {
            options.force_exact = true;
        }
        if self.no_surrogate {
            options.surrogate_query = false;
        }
        if self.no_round {
            options.round = false;
        }
        options
    }
}

async fn cmd_count(
    connection: Option<String>,
    target: TargetArgs,
    overrides: Overrides,
    config: Option<PathBuf>,
) -> ExitCode {
    let loaded = match &config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match loaded {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let conn = match &connection {
        Some(name) => settings.get_connection(name).map(|c| (name.as_str(), c)),
        None => settings
            .default_connection()
            .ok_or_else(|| SettingsError::ConnectionNotFound("default".into())),
    };
    let (name, conn) = match conn {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let (dialect, connection_string) =
        match conn.dialect().and_then(|d| Ok((d, conn.resolved_connection_string()?))) {
            Ok(resolved) => resolved,
            Err(e) => {
                eprintln!("Error in connection '{}': {}", name, e);
                return ExitCode::FAILURE;
            }
        };
    debug!(connection = name, %dialect, "resolved connection");

    let client = match WorkerClient::spawn_with_settings(&settings).await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error starting worker: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let query = target.query(target.table_ref(conn));
    let executor = WorkerExecutor::with_client(client, &conn.driver, connection_string);
    let db = Database::new(Arc::new(executor), dialect);
    let options = overrides.apply(settings.estimate.into());

    match db.statement(query).estimated_count_with(options).await {
        Ok(count) => {
            println!("{}", count);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Count failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_explain(dialect: Dialect, target: TargetArgs, probe: ProbeArgs) -> ExitCode {
    let options = EstimateOptions {
        surrogate_query: !probe.no_surrogate,
        ..EstimateOptions::default()
    };
    let probe = Probe::build(&target.query(target.plain_table_ref()), dialect, options);

    println!("-- Dialect: {}", dialect);
    match probe.strategy {
        Strategy::PlanEstimate => println!("-- Strategy: plan estimate"),
        Strategy::ExactCount => println!("-- Strategy: exact count (no plan estimates)"),
    }
    println!("{}", probe.sql);
    ExitCode::SUCCESS
}
