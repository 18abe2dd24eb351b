//! CLI interface for ama-harness
//!
//! Provides subcommands for:
//! - `prepare`: Write the quote table only
//! - `search`: Parameter search with `ama_params` and ranking
//! - `value`: Single run with `ama_value`, combined series and charts
//! - `config`: Show configuration

mod prepare;
mod search;
mod value;

pub use prepare::PrepareArgs;
pub use search::SearchArgs;
pub use value::ValueArgs;

use crate::report::OutputFormat;
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "ama-harness")]
#[command(about = "Backtest orchestration around the AMA strategy engine")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the symbol's quotes into the shared database
    Prepare(PrepareArgs),
    /// Run the parameter search and rank the results
    Search(SearchArgs),
    /// Run one parameter set and chart its PnL
    Value(ValueArgs),
    /// Show configuration
    Config,
}

/// Print `report` on stdout in the requested format
pub(crate) fn emit<T: Serialize>(
    format: OutputFormat,
    report: &T,
    table: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => println!("{}", table(report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}
