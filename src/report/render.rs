//! Terminal tables, JSON and file exports

use super::{Chart, ParamsReport, ReportError, ResultTable, ValueReport};
use prettytable::{format, Cell as PrettyCell, Row, Table};
use std::fs;
use std::path::{Path, PathBuf};

/// Terminal table for a result table. Missing values print as `NaN`.
pub fn pretty_table(table: &ResultTable) -> Table {
    let mut pretty = Table::new();
    pretty.set_format(*format::consts::FORMAT_BOX_CHARS);
    pretty.set_titles(Row::new(
        table.columns.iter().map(|c| PrettyCell::new(c)).collect(),
    ));
    for row in &table.rows {
        pretty.add_row(Row::new(
            row.iter()
                .map(|cell| {
                    if cell.is_null() {
                        PrettyCell::new("NaN")
                    } else {
                        PrettyCell::new(&cell.to_string())
                    }
                })
                .collect(),
        ));
    }
    pretty
}

/// Write `table` as CSV with a header row
pub fn write_csv(path: &Path, table: &ResultTable) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

impl ParamsReport {
    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        format!(
            r#"
══════════════════════════════════════════════════════
               PARAMETER SEARCH
══════════════════════════════════════════════════════
Parameter sets:   {}
Ranked by:        {} (descending)

TOP {}
{}
BOTTOM {}
{}"#,
            self.total,
            self.rank_column,
            self.top.len(),
            pretty_table(&self.top),
            self.bottom.len(),
            pretty_table(&self.bottom),
        )
    }

    /// Write `params_top.csv` and `params_bottom.csv` into `dir`
    pub fn export(&self, dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
        fs::create_dir_all(dir)?;
        let top = dir.join("params_top.csv");
        let bottom = dir.join("params_bottom.csv");
        write_csv(&top, &self.top)?;
        write_csv(&bottom, &self.bottom)?;
        Ok(vec![top, bottom])
    }
}

impl ValueReport {
    /// Line chart of the combined `total_pnl`
    pub fn pnl_chart(&self) -> Chart {
        Chart::line(
            "total_pnl",
            self.combined
                .iter()
                .map(|r| (r.datetime.clone(), r.total_pnl)),
        )
    }

    /// Bar chart of the PnL attributed to each order
    pub fn order_chart(&self) -> Chart {
        Chart::bar(
            "order_pnl",
            self.orders
                .iter()
                .map(|r| (r.datetime.clone(), r.order_pnl)),
        )
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        let final_pnl = self
            .final_pnl
            .map_or_else(|| "NaN".to_string(), |v| format!("{:+.2}", v));
        format!(
            r#"
══════════════════════════════════════════════════════
               STRATEGY VALUE
══════════════════════════════════════════════════════
Start date:       {}
Combined rows:    {}
Orders:           {}
Final P&L:        {}

ORDERS
{}"#,
            self.start_date,
            self.combined.len(),
            self.orders.len(),
            final_pnl,
            pretty_table(&self.orders_table()),
        )
    }

    /// Write `combined.csv`, `orders.csv`, `total_pnl.svg` and
    /// `order_pnl.svg` into `dir`
    pub fn export(&self, dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
        fs::create_dir_all(dir)?;
        let combined = dir.join("combined.csv");
        let orders = dir.join("orders.csv");
        let pnl_chart = dir.join("total_pnl.svg");
        let order_chart = dir.join("order_pnl.svg");

        write_csv(&combined, &self.combined_table())?;
        write_csv(&orders, &self.orders_table())?;
        self.pnl_chart().save(&pnl_chart)?;
        self.order_chart().save(&order_chart)?;

        Ok(vec![combined, orders, pnl_chart, order_chart])
    }
}
