//! Command-line front end: argument parsing, configuration, store selection.

pub mod config;
pub mod logging;

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::error::ExportError;
use crate::export::{ExportSummary, Exporter};
use crate::logging::info;
use crate::output::WriteMode;
use crate::store::{Store, StoreError, ValueEncoding};

pub use config::{Config, ConfigError, LogFormat, LoggingConfig, StoreConfig};
pub use logging::LoggingError;

/// Export every key-value pair of a key-value database to a JSON file.
#[derive(Parser, Debug, Default)]
#[command(name = "kv-export", version)]
#[command(about = "Export every key-value pair of a key-value database to a JSON file")]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "KV_EXPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output file [default: database_export.json]
    #[arg(short, long, env = "KV_EXPORT_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Database URL; falls back to REPLIT_DB_URL
    #[arg(long)]
    pub db_url: Option<String>,

    /// Export a local fjall database directory instead of the hosted one
    #[arg(long, env = "KV_EXPORT_LOCAL_PATH")]
    pub local: Option<PathBuf>,

    /// Keyspace to export from the local database [default: default]
    #[arg(long)]
    pub keyspace: Option<String>,

    /// Only export keys starting with this prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Pretty-print the JSON document
    #[arg(long)]
    pub pretty: bool,

    /// How the output file is replaced [default: atomic]
    #[arg(long, value_enum)]
    pub write_mode: Option<WriteMode>,

    /// Keep stored values as strings instead of parsing them as JSON
    #[arg(long)]
    pub raw_values: bool,

    /// HTTP request timeout in seconds [default: 30]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Log filter, e.g. "warn" or "kv_export=debug" [default: info]
    #[arg(long, env = "KV_EXPORT_LOG")]
    pub log_level: Option<String>,

    /// Log output format [default: text]
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

/// Errors surfaced by the command-line tool.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl AppError {
    /// Process exit status: 1 for setup problems, otherwise the export's own.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::Logging(_) => 1,
            AppError::Export(e) => e.exit_code(),
        }
    }

    /// A suggestion for common failures.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            AppError::Config(ConfigError::Io(..)) => {
                Some("Check the --config path, or omit it to run with defaults")
            }
            AppError::Config(ConfigError::Parse(_)) => {
                Some("Config tables are [export], [store] and [logging]")
            }
            AppError::Config(ConfigError::Invalid(_)) => None,
            AppError::Logging(LoggingError::InvalidFilter(_)) => {
                Some("Use a level like 'info' or a directive like 'kv_export=debug'")
            }
            AppError::Logging(_) => None,
            AppError::Export(ExportError::StoreUnavailable { source, .. }) => match source {
                StoreError::NotConfigured(_) => Some(
                    "Set REPLIT_DB_URL, pass --db-url <URL>, or export a local store with --local <DIR>",
                ),
                StoreError::Status {
                    status: 401 | 403, ..
                } => Some("The database URL may have expired; fetch a fresh one"),
                StoreError::NotFound(_) => Some("Check the --local path and --keyspace name"),
                _ => None,
            },
            AppError::Export(ExportError::Serialization { key: Some(_), .. }) => {
                Some("Use --raw-values to export stored text that is not JSON")
            }
            AppError::Export(ExportError::Serialization { .. }) => None,
            AppError::Export(ExportError::Write { .. }) => {
                Some("Check that the output directory exists and is writable")
            }
        }
    }
}

/// Read the config file named on the command line (if any) and apply the
/// command-line overrides.
pub fn load_config(cli: &Cli) -> Result<Config, AppError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_cli(cli);
    Ok(config)
}

/// Build the store selected by `config`.
pub fn open_store(
    config: &StoreConfig,
    encoding: ValueEncoding,
) -> Result<Box<dyn Store>, StoreError> {
    if let Some(path) = &config.path {
        return open_local(path, &config.keyspace, encoding);
    }
    open_http(config, encoding)
}

#[cfg(feature = "local")]
fn open_local(
    path: &std::path::Path,
    keyspace: &str,
    encoding: ValueEncoding,
) -> Result<Box<dyn Store>, StoreError> {
    let store = crate::store::LocalStore::open(path, keyspace, encoding)?;
    Ok(Box::new(store))
}

#[cfg(not(feature = "local"))]
fn open_local(
    _path: &std::path::Path,
    _keyspace: &str,
    _encoding: ValueEncoding,
) -> Result<Box<dyn Store>, StoreError> {
    Err(StoreError::NotConfigured(
        "built without local store support".to_string(),
    ))
}

#[cfg(feature = "http")]
fn open_http(config: &StoreConfig, encoding: ValueEncoding) -> Result<Box<dyn Store>, StoreError> {
    use crate::store::{ReplitDb, ReplitDbOptions};

    let options = ReplitDbOptions {
        timeout: config.timeout(),
        encoding,
    };
    let store = match &config.url {
        Some(url) => ReplitDb::new(url, options)?,
        None => ReplitDb::from_env(options)?,
    };
    Ok(Box::new(store))
}

#[cfg(not(feature = "http"))]
fn open_http(_config: &StoreConfig, _encoding: ValueEncoding) -> Result<Box<dyn Store>, StoreError> {
    Err(StoreError::NotConfigured(
        "built without hosted store support; use --local".to_string(),
    ))
}

/// Open the configured store and export it.
pub fn execute(config: &Config) -> Result<ExportSummary, AppError> {
    let store = open_store(&config.store, config.export.value_encoding)
        .map_err(ExportError::connecting)?;
    info!(store = %store.location(), "exporting");

    let exporter = Exporter::new(config.export.options());
    Ok(exporter.export(store.as_ref(), &config.export.output)?)
}
