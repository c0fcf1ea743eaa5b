//! eqlc: dump, check and run EQL queries from the command line.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use eql::{Config, ConfigError, EqlError, Schema, TableDefinition};
use eql_table::{Table, TableError};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "eqlc")]
#[command(version)]
#[command(about = "Compile and run EQL queries", long_about = None)]
struct Cli {
    /// Log filter, e.g. `info` or `eql_compiler=trace`; `RUST_LOG` wins when set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the parsed syntax tree
    Dump {
        /// Path to the .eql file
        file: PathBuf,
    },

    /// Parse and resolve a query, reporting every error
    Check {
        /// Path to the .eql file
        file: PathBuf,

        /// Resolve against this table's schema instead of an empty one
        #[arg(short, long)]
        table: Option<PathBuf>,
    },

    /// Execute a query against a table described in JSON
    Run {
        /// Path to the .eql file
        file: PathBuf,

        /// JSON table definition: properties, actions and events
        #[arg(short, long)]
        table: PathBuf,

        /// Print the bytecode before running
        #[arg(long)]
        disassemble: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Eql(#[from] EqlError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid table {path}: {message}")]
    TableFile { path: PathBuf, message: String },

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write results: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid log filter: {0}")]
    LogFilter(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, CliError> {
    eql::logging::init(&cli.log_level).map_err(|e| CliError::LogFilter(e.to_string()))?;
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    debug!(?config, "loaded configuration");

    match cli.command {
        Commands::Dump { file } => {
            let source = read(&file)?;
            print!("{}", eql::dump(&module_name(&file), &source)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { file, table } => {
            let source = read(&file)?;
            let schema = match table {
                Some(path) => load_table(&path)?.schema().clone(),
                None => Schema::new(),
            };
            match eql::check(&module_name(&file), &source, &schema) {
                Ok(resolution) => {
                    println!("ok: returns {}", resolution.main_return_type);
                    Ok(ExitCode::SUCCESS)
                }
                Err(error) => {
                    report(&file, &source, &error);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Run { file, table, disassemble } => {
            let source = read(&file)?;
            let table = load_table(&table)?;
            let query = match config.compiler().compile(&module_name(&file), &source, table.schema()) {
                Ok(query) => query,
                Err(error) => {
                    report(&file, &source, &error);
                    return Ok(ExitCode::FAILURE);
                }
            };
            if disassemble {
                eprint!("{}", query.disassemble());
            }
            let result = query.execute(&table).map_err(EqlError::from)?;
            info!(rows = result.len(), table = table.name(), "query complete");
            let json = serde_json::to_string_pretty(&result)?;
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Module name from the file stem: `queries/top_users.eql` is `top_users`.
fn module_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_table(path: &Path) -> Result<eql::MemoryTable, CliError> {
    let text = read(path)?;
    let definition: TableDefinition = serde_json::from_str(&text).map_err(|e| CliError::TableFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(definition.build()?)
}

/// Print every error of a failed compilation, with the source line for syntax errors.
fn report(file: &Path, source: &str, error: &EqlError) {
    match error {
        EqlError::Syntax(error) => eprint!("{}: {}", file.display(), error.display_with_source(source)),
        EqlError::Compile(errors) => {
            for error in errors {
                eprintln!("{}: {error}", file.display());
            }
        }
        other => eprintln!("{}: {other}", file.display()),
    }
}
