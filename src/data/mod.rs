//! Quote data module
//!
//! Reads the serialized quote table and selects the rows of one symbol

mod parquet;
mod quote;

pub use parquet::{quote_schema, QuoteReader, QuoteWriter};
pub use quote::{FieldKind, FieldValue, FilterStats, QuoteField, QuoteRow, QuoteTable, DATETIME_FORMAT};

use arrow::error::ArrowError;
use ::parquet::errors::ParquetError;
use std::path::PathBuf;
use thiserror::Error;

/// Quote data errors
#[derive(Debug, Error)]
pub enum DataError {
    /// Source file could not be opened
    #[error("Failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A required column is absent from the file
    #[error("Missing column: {0}")]
    MissingColumn(&'static str),
    /// A column could not be converted to the expected type
    #[error("Column {column} cannot be read as {expected}: {source}")]
    Cast {
        column: String,
        expected: &'static str,
        source: ArrowError,
    },
    /// Downcast after a successful cast failed
    #[error("Invalid {0} column")]
    InvalidColumn(String),
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
