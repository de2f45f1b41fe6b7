//! Configuration file parsing and command-line overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::export::{DEFAULT_OUTPUT, ExportOptions};
use crate::output::WriteMode;
use crate::store::ValueEncoding;

use super::Cli;

/// Configuration loaded from a TOML file. Every table is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub export: ExportConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

/// What to export and where to put it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Output file path.
    pub output: PathBuf,
    /// Only export keys starting with this prefix.
    pub prefix: String,
    pub pretty: bool,
    pub write_mode: WriteMode,
    /// How stored values are decoded.
    pub value_encoding: ValueEncoding,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            prefix: String::new(),
            pretty: false,
            write_mode: WriteMode::default(),
            value_encoding: ValueEncoding::default(),
        }
    }
}

impl ExportConfig {
    pub fn options(&self) -> ExportOptions {
        ExportOptions {
            prefix: self.prefix.clone(),
            pretty: self.pretty,
            write_mode: self.write_mode,
        }
    }
}

/// Which store to read from.
///
/// A local `path` wins over a `url`; with neither, the database URL is taken
/// from the environment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Hosted database URL.
    pub url: Option<String>,
    /// Local fjall database directory.
    pub path: Option<PathBuf>,
    /// Keyspace inside the local database.
    pub keyspace: String,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            path: None,
            keyspace: "default".to_string(),
            timeout_secs: 30,
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "kv_export=debug".
    pub level: String,
    pub format: LogFormat,
    /// "stderr", "stdout", or a file path to append to.
    pub output: String,
    /// ANSI colors when writing to a terminal.
    pub color: bool,
    pub timestamps: bool,
    /// Include the event target (module path).
    pub target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            output: "stderr".to_string(),
            color: true,
            timestamps: true,
            target: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().display().to_string(), e))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.store.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "store.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Layer command-line flags (and their environment variables) on top.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(output) = &cli.output {
            self.export.output = output.clone();
        }
        if let Some(prefix) = &cli.prefix {
            self.export.prefix = prefix.clone();
        }
        if cli.pretty {
            self.export.pretty = true;
        }
        if let Some(mode) = cli.write_mode {
            self.export.write_mode = mode;
        }
        if cli.raw_values {
            self.export.value_encoding = ValueEncoding::Raw;
        }

        if let Some(path) = &cli.local {
            self.store.path = Some(path.clone());
        } else if let Some(url) = &cli.db_url {
            self.store.url = Some(url.clone());
            self.store.path = None;
        }
        if let Some(keyspace) = &cli.keyspace {
            self.store.keyspace = keyspace.clone();
        }
        if let Some(timeout) = cli.timeout {
            self.store.timeout_secs = timeout;
        }

        if let Some(level) = &cli.log_level {
            self.logging.level = level.clone();
        }
        if let Some(format) = cli.log_format {
            self.logging.format = format;
        }
    }
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(String, std::io::Error),
    /// TOML parse error.
    Parse(toml::de::Error),
    /// A value outside its allowed range.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Failed to read config file '{}': {}", path, e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
