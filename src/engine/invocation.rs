//! Engine command lines

use super::EngineError;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};

/// Parse `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Validated date range, kept in the caller's spelling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunWindow {
    start: String,
    end: String,
}

impl RunWindow {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Result<Self, EngineError> {
        let start = start.into();
        let end = end.into();
        let from = parse_date(&start).ok_or_else(|| EngineError::InvalidDate(start.clone()))?;
        let to = parse_date(&end).ok_or_else(|| EngineError::InvalidDate(end.clone()))?;
        if from > to {
            return Err(EngineError::InvertedWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }
}

/// The four positional numbers `ama_value` takes after the date range.
///
/// Their meaning belongs to the engine; they are forwarded in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyParams([f64; 4]);

impl StrategyParams {
    pub fn new(values: [f64; 4]) -> Result<Self, EngineError> {
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(EngineError::InvalidParam(*bad));
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> [f64; 4] {
        self.0
    }

    /// Command-line spelling; whole numbers print without a fraction
    pub fn args(&self) -> Vec<String> {
        self.0.iter().map(|v| v.to_string()).collect()
    }
}

/// One engine run
#[derive(Debug, Clone, PartialEq)]
pub enum EngineInvocation {
    /// `ama_params <db_uri> <start> <end>`
    ParamSearch {
        program: PathBuf,
        db_uri: String,
        window: RunWindow,
    },
    /// `ama_value <db_uri> <start> <end> <p1> <p2> <p3> <p4>`
    Value {
        program: PathBuf,
        db_uri: String,
        window: RunWindow,
        params: StrategyParams,
    },
}

impl EngineInvocation {
    pub fn program(&self) -> &Path {
        match self {
            EngineInvocation::ParamSearch { program, .. } | EngineInvocation::Value { program, .. } => {
                program
            }
        }
    }

    /// Positional arguments, program excluded
    pub fn args(&self) -> Vec<String> {
        match self {
            EngineInvocation::ParamSearch { db_uri, window, .. } => vec![
                db_uri.clone(),
                window.start().to_string(),
                window.end().to_string(),
            ],
            EngineInvocation::Value {
                db_uri,
                window,
                params,
                ..
            } => {
                let mut args = vec![
                    db_uri.clone(),
                    window.start().to_string(),
                    window.end().to_string(),
                ];
                args.extend(params.args());
                args
            }
        }
    }
}
