//! ama-harness: orchestration around the AMA strategy engine
//!
//! This library provides the pieces of a run-once backtest workflow:
//! - Loading a GZIP Parquet quote table and filtering it to one symbol
//! - Writing the `quote` table into the shared SQLite database
//! - Launching the external `ama_params` / `ama_value` engine and draining its output
//! - Reading the engine's result tables back and ranking or combining them
//! - Table, JSON, CSV and SVG chart output

pub mod cli;
pub mod config;
pub mod data;
pub mod engine;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod telemetry;
