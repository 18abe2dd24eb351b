//! Workflow pipelines
//!
//! Each workflow runs its stages strictly in order: quotes are committed and
//! the connection closed before the engine starts, and the engine's output
//! is drained before any result is read.
//!
//! The engine opens the shared and result databases relative to its own
//! working directory; the harness resolves the same paths through
//! [`EngineConfig::resolve`](crate::config::EngineConfig::resolve).

use crate::config::Config;
use crate::data::{FilterStats, QuoteReader};
use crate::engine::{EngineInvocation, EngineLauncher, EngineRun, RunWindow, StrategyParams};
use crate::report::{ParamsRanking, ParamsReport, ValueReport};
use crate::store::{QuoteStore, ResultStore};
use anyhow::Context;
use serde::Serialize;

/// Outcome of the data-preparation stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PrepareSummary {
    pub rows_read: usize,
    pub rows_for_symbol: usize,
    pub rows_dropped: usize,
    pub rows_written: usize,
}

impl From<(FilterStats, usize)> for PrepareSummary {
    fn from((stats, rows_written): (FilterStats, usize)) -> Self {
        Self {
            rows_read: stats.rows_read,
            rows_for_symbol: stats.rows_for_symbol,
            rows_dropped: stats.rows_dropped,
            rows_written,
        }
    }
}

/// Load the quote file, keep one symbol's complete rows and replace the
/// quote table of the shared database with them.
pub fn prepare_quotes(config: &Config) -> anyhow::Result<PrepareSummary> {
    let data = &config.data;
    let quotes = QuoteReader::new(&data.quote_path)
        .read()
        .with_context(|| format!("Failed to read quotes from {:?}", data.quote_path))?;

    let (selected, stats) = quotes.select_symbol(&data.symbol);
    if selected.is_empty() {
        tracing::warn!(symbol = %data.symbol, "No complete rows for symbol; writing an empty table");
    }

    let shared_db = config.engine.resolve(&data.shared_db);
    let mut store = QuoteStore::open(&shared_db.to_string_lossy())
        .with_context(|| format!("Failed to open shared database {:?}", shared_db))?;
    let written = store
        .replace_table(&data.quote_table, &selected)
        .context("Failed to write quote table")?;

    let summary = PrepareSummary::from((stats, written));
    tracing::info!(
        symbol = %data.symbol,
        rows_read = summary.rows_read,
        rows_dropped = summary.rows_dropped,
        rows_written = summary.rows_written,
        "Prepared quotes"
    );

    Ok(summary)
}

/// Parameter search: prepare, run `ama_params`, rank `params`
pub async fn run_search<L>(
    config: &Config,
    launcher: &L,
    skip_engine: bool,
) -> anyhow::Result<ParamsReport>
where
    L: EngineLauncher + ?Sized,
{
    let search = &config.search;

    if !skip_engine {
        let window = RunWindow::new(&search.start_date, &search.end_date)?;
        prepare_quotes(config)?;

        let invocation = EngineInvocation::ParamSearch {
            program: config.engine.resolve(&config.engine.params_bin),
            db_uri: config.data.shared_db.clone(),
            window,
        };
        launch(launcher, &invocation).await?;
    }

    let result_db = config.engine.resolve(&search.result_db);
    let table = ResultStore::open(&result_db)
        .and_then(|store| store.load_table(&search.table))
        .with_context(|| format!("Failed to load {} from {:?}", search.table, result_db))?;

    let ranking = ParamsRanking {
        rank_column: search.rank_column.clone(),
        drop_columns: search.drop_columns.clone(),
        limit: search.top_n,
    };
    let report = ranking.rank(table).context("Failed to rank parameter sets")?;

    Ok(report)
}

/// Single strategy run: prepare, run `ama_value`, combine positions and
/// signals
pub async fn run_value<L>(
    config: &Config,
    launcher: &L,
    skip_engine: bool,
) -> anyhow::Result<ValueReport>
where
    L: EngineLauncher + ?Sized,
{
    let value = &config.value;
    let window = RunWindow::new(&value.start_date, &value.end_date)?;

    if !skip_engine {
        let params = StrategyParams::new(value.params)?;
        prepare_quotes(config)?;

        let invocation = EngineInvocation::Value {
            program: config.engine.resolve(&config.engine.value_bin),
            db_uri: config.data.shared_db.clone(),
            window: window.clone(),
            params,
        };
        launch(launcher, &invocation).await?;
    }

    let result_db = config.engine.resolve(&value.result_db);
    let store = ResultStore::open(&result_db)
        .with_context(|| format!("Failed to open result database {:?}", result_db))?;
    let positions = store
        .load_positions(&value.position_table)
        .with_context(|| format!("Failed to load {}", value.position_table))?;
    let signals = store
        .load_signals(&value.signal_table)
        .with_context(|| format!("Failed to load {}", value.signal_table))?;

    let report = ValueReport::build(&positions, &signals, window.start())
        .context("Failed to combine position and signal tables")?;

    Ok(report)
}

async fn launch<L>(launcher: &L, invocation: &EngineInvocation) -> anyhow::Result<EngineRun>
where
    L: EngineLauncher + ?Sized,
{
    let run = launcher
        .launch(invocation)
        .await
        .with_context(|| format!("Engine {:?} failed to run", invocation.program()))?;
    tracing::debug!(lines = run.lines, exit_code = ?run.exit_code, "Engine output drained");
    Ok(run)
}
