//! Output handler traits and types
//!
//! This module defines the trait interface for export handlers and the
//! errors they can raise.

use crate::model::ProductRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for export destinations
///
/// Handlers receive records in the order the caller chose (arrival order or
/// sorted) and must preserve it.
pub trait OutputHandler {
    /// Writes a batch of records
    ///
    /// May be called more than once before `finalize`.
    fn write_records(&mut self, records: &[ProductRecord]) -> OutputResult<()>;

    /// Flushes everything written so far
    fn finalize(&mut self) -> OutputResult<()>;
}
