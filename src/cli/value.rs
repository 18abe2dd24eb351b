//! Value command implementation

use crate::config::Config;
use crate::engine::ProcessLauncher;
use crate::pipeline;
use crate::report::OutputFormat;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValueArgs {
    /// Run start (YYYY-MM-DD); signals before it are not reported
    #[arg(long)]
    pub start: Option<String>,

    /// Run end (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,

    /// The four positional engine parameters
    #[arg(
        long,
        num_args = 4,
        value_names = ["P1", "P2", "P3", "P4"],
        allow_negative_numbers = true
    )]
    pub params: Option<Vec<f64>>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Output directory for exports and charts
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Report on existing results without running the engine
    #[arg(long)]
    pub skip_engine: bool,

    /// Discard engine output instead of logging it
    #[arg(long)]
    pub quiet_engine: bool,
}

impl ValueArgs {
    /// Override configuration with command-line values
    pub fn apply(&self, config: &mut Config) -> anyhow::Result<()> {
        if let Some(start) = &self.start {
            config.value.start_date = start.clone();
        }
        if let Some(end) = &self.end {
            config.value.end_date = end.clone();
        }
        if let Some(params) = &self.params {
            config.value.params = params
                .as_slice()
                .try_into()
                .map_err(|_| anyhow::anyhow!("Expected 4 parameters, got {}", params.len()))?;
        }
        if let Some(format) = self.format {
            config.report.format = format;
        }
        if let Some(output) = &self.output {
            config.report.output_dir = output.clone();
        }
        if self.quiet_engine {
            config.value.echo_output = false;
        }
        Ok(())
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut config = config.clone();
        self.apply(&mut config)?;

        let launcher = ProcessLauncher::new()
            .with_working_dir(config.engine.working_dir.clone())
            .with_echo(config.value.echo_output);

        let report = pipeline::run_value(&config, &launcher, self.skip_engine).await?;
        let written = report.export(&config.report.output_dir)?;
        tracing::info!(files = ?written, "Exported combined series and charts");

        super::emit(config.report.format, &report, |r| r.format_table())
    }
}
