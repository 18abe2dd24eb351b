//! Result reporting module
//!
//! Ranks parameter-search results and rebuilds the position/signal series

mod chart;
mod params;
mod render;
mod table;
mod value;

pub use chart::{Chart, ChartKind};
pub use params::{ParamsRanking, ParamsReport};
pub use render::{pretty_table, write_csv};
pub use table::{Cell, ResultTable};
pub use value::{
    combine, order_pnl, CombinedRow, OrderRow, PositionRecord, SignalRecord, ValueReport,
    COMBINED_COLUMNS, POST_TRADE,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Report errors
#[derive(Debug, Error)]
pub enum ReportError {
    /// An expected column is absent
    #[error("Missing column: {0}")]
    MissingColumn(String),
    /// Row width differs from the column count
    #[error("Row has {found} cells, table has {expected} columns")]
    RowWidth { expected: usize, found: usize },
    /// The same datetime appears twice on one side of a join
    #[error("Duplicate datetime {datetime} in {table} table")]
    DuplicateDatetime {
        table: &'static str,
        datetime: String,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// JSON document on stdout
    Json,
}
