//! Search command implementation

use crate::config::Config;
use crate::engine::ProcessLauncher;
use crate::pipeline;
use crate::report::OutputFormat;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search window start (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Search window end (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,

    /// Rows shown at each end of the ranking
    #[arg(long)]
    pub top: Option<usize>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Output directory for exports
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Rank existing results without running the engine
    #[arg(long)]
    pub skip_engine: bool,

    /// Log engine output
    #[arg(long)]
    pub echo: bool,
}

impl SearchArgs {
    /// Override configuration with command-line values
    pub fn apply(&self, config: &mut Config) {
        if let Some(start) = &self.start {
            config.search.start_date = start.clone();
        }
        if let Some(end) = &self.end {
            config.search.end_date = end.clone();
        }
        if let Some(top) = self.top {
            config.search.top_n = top;
        }
        if let Some(format) = self.format {
            config.report.format = format;
        }
        if let Some(output) = &self.output {
            config.report.output_dir = output.clone();
        }
        if self.echo {
            config.search.echo_output = true;
        }
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut config = config.clone();
        self.apply(&mut config);

        let launcher = ProcessLauncher::new()
            .with_working_dir(config.engine.working_dir.clone())
            .with_echo(config.search.echo_output);

        let report = pipeline::run_search(&config, &launcher, self.skip_engine).await?;
        let written = report.export(&config.report.output_dir)?;
        tracing::info!(files = ?written, "Exported parameter ranking");

        super::emit(config.report.format, &report, |r| r.format_table())
    }
}
