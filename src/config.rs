//! Configuration types for ama-harness

use crate::report::OutputFormat;
use crate::telemetry::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub value: ValueConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Quote source and shared database
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// GZIP Parquet quote file
    #[serde(default = "default_quote_path")]
    pub quote_path: PathBuf,

    /// Symbol whose rows are handed to the engine
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Connection string shared with the engine, passed through unchanged
    #[serde(default = "default_shared_db")]
    pub shared_db: String,

    /// Table the engine reads quotes from
    #[serde(default = "default_quote_table")]
    pub quote_table: String,
}

fn default_quote_path() -> PathBuf {
    PathBuf::from("access/future_weight_index_60min.parquet")
}
fn default_symbol() -> String {
    "RB".to_string()
}
fn default_shared_db() -> String {
    "FullUri=file:mydb.sqlite?cache=shared".to_string()
}
fn default_quote_table() -> String {
    "quote".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            quote_path: default_quote_path(),
            symbol: default_symbol(),
            shared_db: default_shared_db(),
            quote_table: default_quote_table(),
        }
    }
}

/// Engine binaries
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default = "default_params_bin")]
    pub params_bin: PathBuf,

    #[serde(default = "default_value_bin")]
    pub value_bin: PathBuf,

    /// Directory the engine runs in; defaults to the current directory.
    /// Relative binaries and database paths are resolved against it.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl EngineConfig {
    /// Where a path the engine opens from its own directory lives for the
    /// harness. Absolute paths are returned unchanged.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match &self.working_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn default_params_bin() -> PathBuf {
    PathBuf::from("./ama_params")
}
fn default_value_bin() -> PathBuf {
    PathBuf::from("./ama_value")
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            params_bin: default_params_bin(),
            value_bin: default_value_bin(),
            working_dir: None,
        }
    }
}

/// Parameter-search workflow
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_start")]
    pub start_date: String,

    #[serde(default = "default_search_end")]
    pub end_date: String,

    /// Database the engine writes `params` into
    #[serde(default = "default_search_result_db")]
    pub result_db: PathBuf,

    #[serde(default = "default_params_table")]
    pub table: String,

    /// Column ranked on, largest first
    #[serde(default = "default_rank_column")]
    pub rank_column: String,

    /// Columns removed from the report
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,

    /// Rows shown at each end of the ranking
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Log engine output at info level
    #[serde(default)]
    pub echo_output: bool,
}

fn default_search_start() -> String {
    "2020-01-01".to_string()
}
fn default_search_end() -> String {
    "2023-05-12".to_string()
}
fn default_search_result_db() -> PathBuf {
    PathBuf::from("result.sqlite")
}
fn default_params_table() -> String {
    "params".to_string()
}
fn default_rank_column() -> String {
    "final_pnl".to_string()
}
fn default_drop_columns() -> Vec<String> {
    vec!["ama_long".to_string()]
}
fn default_top_n() -> usize {
    100
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            start_date: default_search_start(),
            end_date: default_search_end(),
            result_db: default_search_result_db(),
            table: default_params_table(),
            rank_column: default_rank_column(),
            drop_columns: default_drop_columns(),
            top_n: default_top_n(),
            echo_output: false,
        }
    }
}

/// Single-run value workflow
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValueConfig {
    #[serde(default = "default_value_start")]
    pub start_date: String,

    #[serde(default = "default_value_end")]
    pub end_date: String,

    /// Positional numbers forwarded to the engine after the dates
    #[serde(default = "default_value_params")]
    pub params: [f64; 4],

    #[serde(default = "default_value_result_db")]
    pub result_db: PathBuf,

    #[serde(default = "default_position_table")]
    pub position_table: String,

    #[serde(default = "default_signal_table")]
    pub signal_table: String,

    /// Log engine output at info level
    #[serde(default = "default_true")]
    pub echo_output: bool,
}

fn default_value_start() -> String {
    "2021-01-01".to_string()
}
fn default_value_end() -> String {
    "2023-05-15".to_string()
}
fn default_value_params() -> [f64; 4] {
    [2.0, 30.0, 11.0, 3.0]
}
fn default_value_result_db() -> PathBuf {
    PathBuf::from("value_result.sqlite")
}
fn default_position_table() -> String {
    "position_table".to_string()
}
fn default_signal_table() -> String {
    "signal_table".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for ValueConfig {
    fn default() -> Self {
        Self {
            start_date: default_value_start(),
            end_date: default_value_end(),
            params: default_value_params(),
            result_db: default_value_result_db(),
            position_table: default_position_table(),
            signal_table: default_signal_table(),
            echo_output: true,
        }
    }
}

/// Report output
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Directory for CSV exports and charts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub format: OutputFormat,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            format: OutputFormat::Table,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
