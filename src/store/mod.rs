//! SQLite storage module
//!
//! Writes the engine's input table and reads its result tables back

mod quote_store;
mod result_store;

pub use quote_store::QuoteStore;
pub use result_store::ResultStore;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Table name cannot be used as an identifier
    #[error("Invalid table name: {0:?}")]
    InvalidTable(String),
    /// Result row does not fit the report table
    #[error("Report error: {0}")]
    Report(#[from] crate::report::ReportError),
}

/// Double-quote an SQL identifier
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub(crate) fn check_table_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name.contains('\0') {
        return Err(StoreError::InvalidTable(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("quote"), "\"quote\"");
        assert_eq!(quote_ident("index"), "\"index\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_check_table_name() {
        assert!(check_table_name("params").is_ok());
        assert!(check_table_name("").is_err());
        assert!(check_table_name("a\0b").is_err());
    }
}
