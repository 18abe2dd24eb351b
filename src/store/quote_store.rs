//! Shared input database

use super::{check_table_name, quote_ident, StoreError};
use crate::data::{FieldKind, FieldValue, QuoteTable};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

/// Connection to the database the engine reads its quotes from.
///
/// The connection string is opaque: it is handed to SQLite unchanged, exactly
/// as it is handed to the engine on its command line.
pub struct QuoteStore {
    conn: Connection,
}

impl QuoteStore {
    /// Open or create the shared database
    pub fn open(db_uri: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(db_uri)?;
        tracing::debug!(db = db_uri, "Opened shared database");
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Drop `table` and rewrite it from `quotes` in one transaction.
    ///
    /// Columns are `index`, `datetime`, `symbol`, then every field in source
    /// order as REAL or TEXT. Returns the number of rows written.
    pub fn replace_table(&mut self, table: &str, quotes: &QuoteTable) -> Result<usize, StoreError> {
        check_table_name(table)?;
        let name = quote_ident(table);

        let mut columns = vec![
            format!("{} INTEGER", quote_ident("index")),
            format!("{} TIMESTAMP", quote_ident("datetime")),
            format!("{} TEXT", quote_ident("symbol")),
        ];
        columns.extend(
            quotes
                .fields
                .iter()
                .map(|f| {
                    let affinity = match f.kind {
                        FieldKind::Real => "REAL",
                        FieldKind::Text => "TEXT",
                    };
                    format!("{} {}", quote_ident(&f.name), affinity)
                }),
        );
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();

        let tx = self.conn.transaction()?;
        let mut count = 0;

        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {name};
             CREATE TABLE {name} ({columns});
             CREATE INDEX {index} ON {name} ({key});",
            name = name,
            columns = columns.join(", "),
            index = quote_ident(&format!("ix_{}_index", table)),
            key = quote_ident("index"),
        ))?;

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} VALUES ({})",
                name,
                placeholders.join(", ")
            ))?;

            for row in &quotes.rows {
                let mut values = Vec::with_capacity(placeholders.len());
                values.push(Value::Integer(row.index));
                values.push(row.datetime_text().map_or(Value::Null, Value::Text));
                values.push(row.symbol.clone().map_or(Value::Null, Value::Text));
                values.extend(row.values.iter().map(|v| match v {
                    Some(FieldValue::Real(x)) if !x.is_nan() => Value::Real(*x),
                    Some(FieldValue::Text(t)) => Value::Text(t.clone()),
                    _ => Value::Null,
                }));

                stmt.execute(params_from_iter(values))?;
                count += 1;
            }
        }

        tx.commit()?;

        tracing::info!(table, rows = count, "Replaced quote table");

        Ok(count)
    }

    /// Number of rows currently in `table`
    pub fn count_rows(&self, table: &str) -> Result<usize, StoreError> {
        check_table_name(table)?;
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Column names of `table`, in declaration order
    pub fn columns(&self, table: &str) -> Result<Vec<String>, StoreError> {
        check_table_name(table)?;
        let columns = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }
}
