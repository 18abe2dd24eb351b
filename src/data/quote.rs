//! Quote rows and symbol selection

use chrono::NaiveDateTime;
use serde::Serialize;

/// Text layout of `datetime` values in the quote table
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Storage class of a quote field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Real,
    Text,
}

/// A named column besides `datetime` and `symbol`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteField {
    pub name: String,
    pub kind: FieldKind,
}

impl QuoteField {
    pub fn real(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Real,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text,
        }
    }
}

/// One field value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Real(f64),
    Text(String),
}

impl FieldValue {
    /// NaN counts as missing
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Real(x) if x.is_nan())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Real(x) => Some(*x),
            FieldValue::Text(_) => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Real(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// A single row of the source table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteRow {
    /// Position of the row in the source file
    pub index: i64,
    pub datetime: Option<NaiveDateTime>,
    pub symbol: Option<String>,
    /// Field values, aligned with [`QuoteTable::fields`]
    pub values: Vec<Option<FieldValue>>,
}

impl QuoteRow {
    /// True when no column is missing
    pub fn is_complete(&self) -> bool {
        self.datetime.is_some()
            && self.symbol.is_some()
            && self
                .values
                .iter()
                .all(|v| matches!(v, Some(x) if !x.is_missing()))
    }

    /// `datetime` rendered the way it is stored in SQLite
    pub fn datetime_text(&self) -> Option<String> {
        self.datetime
            .map(|dt| dt.format(DATETIME_FORMAT).to_string())
    }
}

/// Row counts produced by [`QuoteTable::select_symbol`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub rows_read: usize,
    pub rows_for_symbol: usize,
    pub rows_dropped: usize,
}

/// In-memory quote table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteTable {
    /// Field columns, in source order
    pub fields: Vec<QuoteField>,
    pub rows: Vec<QuoteRow>,
}

impl QuoteTable {
    pub fn new(fields: Vec<QuoteField>) -> Self {
        Self {
            fields,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: QuoteRow) {
        debug_assert_eq!(row.values.len(), self.fields.len());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose symbol equals `symbol` exactly
    pub fn for_symbol(&self, symbol: &str) -> QuoteTable {
        QuoteTable {
            fields: self.fields.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| row.symbol.as_deref() == Some(symbol))
                .cloned()
                .collect(),
        }
    }

    /// Drop every row with a missing value
    pub fn drop_incomplete(mut self) -> QuoteTable {
        self.rows.retain(QuoteRow::is_complete);
        self
    }

    /// Symbol match followed by incomplete-row removal
    pub fn select_symbol(&self, symbol: &str) -> (QuoteTable, FilterStats) {
        let matched = self.for_symbol(symbol);
        let rows_for_symbol = matched.len();
        let kept = matched.drop_incomplete();

        let stats = FilterStats {
            rows_read: self.len(),
            rows_for_symbol,
            rows_dropped: rows_for_symbol - kept.len(),
        };
        (kept, stats)
    }
}
