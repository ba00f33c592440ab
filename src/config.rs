use crate::error::Result;
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Personal banking ledger", long_about = None)]
pub struct CliArgs {
    /// Operations CSV file (type, account, counterparty, amount, name, pin)
    pub input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the transaction log as CSV to this file
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Log level (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct LedgerConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StorageConfig {
    /// Persistent store location. In-memory when absent.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Wait for the write-ahead log to reach disk on every commit.
    #[serde(default = "default_sync_writes")]
    pub sync_writes: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

fn default_sync_writes() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            sync_writes: default_sync_writes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl LedgerConfig {
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads the config file named on the command line, if any, then applies
    /// the command-line overrides.
    pub fn load(cli: &CliArgs) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_toml(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };

        // CLI overrides
        if let Some(db_path) = &cli.db_path {
            config.storage.db_path = Some(db_path.clone());
        }
        if let Some(level) = &cli.log_level {
            config.logging.level = level.clone();
        }

        Ok(config)
    }
}
