//! Strategy engine module
//!
//! Builds the engine's positional command line and runs it as a subprocess

mod invocation;
mod process;

pub use invocation::{parse_date, EngineInvocation, RunWindow, StrategyParams};
pub use process::ProcessLauncher;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Date is neither `YYYY-MM-DD` nor `YYYY-MM-DD HH:MM:SS`
    #[error("Invalid date: {0:?}")]
    InvalidDate(String),
    /// Window ends before it starts
    #[error("Start date {start} is after end date {end}")]
    InvertedWindow { start: String, end: String },
    /// Strategy parameter is not a finite number
    #[error("Invalid strategy parameter: {0}")]
    InvalidParam(f64),
    /// Process could not be started
    #[error("Failed to launch {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },
    /// Child was started without the requested pipe
    #[error("Engine {0} pipe unavailable")]
    MissingPipe(&'static str),
    #[error("Output reader failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of one engine run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineRun {
    /// Lines read from the merged output stream
    pub lines: usize,
    /// Exit code; `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
}

/// Trait for engine launchers
#[async_trait]
pub trait EngineLauncher: Send + Sync {
    /// Start the engine and drain its output until end-of-stream
    async fn launch(&self, invocation: &EngineInvocation) -> Result<EngineRun, EngineError>;
}
