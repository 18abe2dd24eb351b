//! Parameter-search ranking

use super::{ReportError, ResultTable};
use serde::Serialize;

/// How the `params` table is ranked
#[derive(Debug, Clone, PartialEq)]
pub struct ParamsRanking {
    /// Column sorted on, largest first
    pub rank_column: String,
    /// Columns removed before reporting
    pub drop_columns: Vec<String>,
    /// Rows in each of the top and bottom views
    pub limit: usize,
}

impl Default for ParamsRanking {
    fn default() -> Self {
        Self {
            rank_column: "final_pnl".to_string(),
            drop_columns: vec!["ama_long".to_string()],
            limit: 100,
        }
    }
}

/// Best and worst parameter sets
#[derive(Debug, Clone, Serialize)]
pub struct ParamsReport {
    pub rank_column: String,
    /// Rows in the full table
    pub total: usize,
    pub top: ResultTable,
    pub bottom: ResultTable,
}

impl ParamsRanking {
    /// Sort `table` on the rank column, drop the configured columns and
    /// slice off the top and bottom views.
    pub fn rank(&self, mut table: ResultTable) -> Result<ParamsReport, ReportError> {
        table.sort_descending(&self.rank_column)?;
        for column in &self.drop_columns {
            table.drop_column(column)?;
        }

        tracing::debug!(rows = table.len(), limit = self.limit, "Ranked parameter sets");

        Ok(ParamsReport {
            rank_column: self.rank_column.clone(),
            total: table.len(),
            top: table.head(self.limit),
            bottom: table.tail(self.limit),
        })
    }
}

impl ParamsReport {
    /// Best row, if any
    pub fn best(&self) -> Option<&[super::Cell]> {
        self.top.rows.first().map(Vec::as_slice)
    }
}
