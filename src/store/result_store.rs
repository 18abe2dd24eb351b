//! Engine result database

use super::{check_table_name, quote_ident, StoreError};
use crate::report::{Cell, PositionRecord, ResultTable, SignalRecord};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

impl From<ValueRef<'_>> for Cell {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Integer(i),
            ValueRef::Real(f) => Cell::Real(f),
            ValueRef::Text(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Cell::Blob(b.to_vec()),
        }
    }
}

/// Read-only view of a database written by the engine
pub struct ResultStore {
    conn: Connection,
}

impl ResultStore {
    /// Open an existing result database
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        tracing::debug!(path = ?path.as_ref(), "Opened result database");
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub(crate) fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Every row and column of `table`
    pub fn load_table(&self, table: &str) -> Result<ResultTable, StoreError> {
        check_table_name(table)?;
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {}", quote_ident(table)))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let mut result = ResultTable::new(columns);
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let cells = (0..width)
                .map(|i| row.get_ref(i).map(Cell::from))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            result.push_row(cells)?;
        }

        tracing::debug!(table, rows = result.len(), "Loaded result table");

        Ok(result)
    }

    /// Position snapshots, in table order
    pub fn load_positions(&self, table: &str) -> Result<Vec<PositionRecord>, StoreError> {
        check_table_name(table)?;
        let positions = self
            .conn
            .prepare(&format!(
                "SELECT datetime, status, current_price, total_pnl FROM {}",
                quote_ident(table)
            ))?
            .query_map([], |row| {
                Ok(PositionRecord {
                    datetime: row.get(0)?,
                    status: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    current_price: row.get(2)?,
                    total_pnl: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(positions)
    }

    /// Signal rows, in table order
    pub fn load_signals(&self, table: &str) -> Result<Vec<SignalRecord>, StoreError> {
        check_table_name(table)?;
        let signals = self
            .conn
            .prepare(&format!(
                "SELECT datetime, close_price, signal, order_volume FROM {}",
                quote_ident(table)
            ))?
            .query_map([], |row| {
                Ok(SignalRecord {
                    datetime: row.get(0)?,
                    close_price: row.get(1)?,
                    signal: row.get(2)?,
                    order_volume: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(signals)
    }
}
