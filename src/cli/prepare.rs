//! Prepare command implementation

use crate::config::Config;
use crate::pipeline;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Quote file (GZIP Parquet)
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Symbol to keep
    #[arg(long)]
    pub symbol: Option<String>,
}

impl PrepareArgs {
    /// Override configuration with command-line values
    pub fn apply(&self, config: &mut Config) {
        if let Some(source) = &self.source {
            config.data.quote_path = source.clone();
        }
        if let Some(symbol) = &self.symbol {
            config.data.symbol = symbol.clone();
        }
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut config = config.clone();
        self.apply(&mut config);

        let summary = pipeline::prepare_quotes(&config)?;
        println!(
            "Wrote {} {} rows to {} ({} read, {} dropped as incomplete)",
            summary.rows_written,
            config.data.symbol,
            config.data.quote_table,
            summary.rows_read,
            summary.rows_dropped
        );
        Ok(())
    }
}
