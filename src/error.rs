//! Error types for gdb-extract
//!
//! This module defines the error hierarchy for:
//! - Geodatabase access through the reader backend
//! - Configuration and CLI errors
//! - Workbook export errors
//! - Schema report (CSV) errors
//!
//! Per-unit failures (one container, one layer) are not errors at the
//! batch level: they are carried as tagged outcomes and only logged.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the gdb-extract application
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Geodatabase access errors
    #[error("Geodatabase error: {0}")]
    Gdb(#[from] GdbError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Workbook export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Errors raised by a geodatabase reader backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GdbError {
    /// Container could not be opened
    #[error("Failed to open geodatabase '{path}': {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    /// Layer definition could not be read
    #[error("Failed to read schema of layer '{layer}': {reason}")]
    LayerSchema { layer: String, reason: String },

    /// Layer content could not be read
    #[error("Failed to read layer '{layer}': {reason}")]
    LayerRead { layer: String, reason: String },

    /// Layer does not exist in the container
    #[error("Layer not found: '{layer}'")]
    LayerNotFound { layer: String },

    /// Geometry could not be decoded
    #[error("Failed to decode geometry of feature {feature} in '{layer}': {reason}")]
    Geometry {
        layer: String,
        feature: u64,
        reason: String,
    },

    /// Binary was built without a geodatabase backend
    #[error("No geodatabase backend available (rebuild with --features gdal)")]
    BackendUnavailable,
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Scan root does not exist
    #[error("Scan root '{path}' does not exist")]
    RootNotFound { path: PathBuf },

    /// Scan root is not a directory
    #[error("Scan root '{path}' is not a directory")]
    RootNotDirectory { path: PathBuf },

    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid exclusion pattern
    #[error("Invalid exclusion pattern '{pattern}': {reason}")]
    InvalidExcludePattern { pattern: String, reason: String },

    /// Output path error
    #[error("Invalid output path '{path}': {reason}")]
    InvalidOutputPath { path: PathBuf, reason: String },

    /// No geodatabase given to export
    #[error("A geodatabase path is required")]
    MissingGdbPath,

    /// Geodatabase to export does not exist
    #[error("Geodatabase '{path}' does not exist")]
    GdbNotFound { path: PathBuf },

    /// Interactive input could not be read
    #[error("Failed to read input: {0}")]
    Prompt(String),
}

/// Workbook export errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// Layer listing failed
    #[error(
        "Could not list layers of '{path}' (inaccessible or unsupported format): {reason}"
    )]
    ListLayers { path: PathBuf, reason: String },

    /// Container has no layers at all
    #[error("Geodatabase '{path}' contains no layers")]
    NoLayers { path: PathBuf },

    /// Every layer matched an exclusion pattern
    #[error("No layers to process in '{path}': all {excluded} layers were excluded by filters")]
    AllLayersExcluded { path: PathBuf, excluded: usize },

    /// Every kept layer failed both read attempts
    #[error("No layer of '{path}' could be exported")]
    NothingExported { path: PathBuf },

    /// A sheet could not be written
    #[error("Failed to write sheet '{sheet}': {reason}")]
    Sheet { sheet: String, reason: String },

    /// Workbook writer error
    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

/// Schema report (CSV) errors
#[derive(Error, Debug)]
pub enum ReportError {
    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Scan worker errors
///
/// Never escape the pool: they are folded into the failed outcome of the
/// container being processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// Worker thread could not be started
    #[error("Worker {id} failed to start: {reason}")]
    InitFailed { id: usize, reason: String },

    /// Worker panicked while processing a container
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Container was queued but never processed
    #[error("Worker pool terminated before processing container")]
    Abandoned,
}

/// Result type alias for ExtractError
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Result type alias for GdbError
pub type GdbResult<T> = std::result::Result<T, GdbError>;

/// Result type alias for ExportError
pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Result type alias for ReportError
pub type ReportResult<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let gdb_err = GdbError::LayerNotFound {
            layer: "roads".into(),
        };
        let err: ExtractError = gdb_err.into();
        assert!(matches!(err, ExtractError::Gdb(_)));
    }

    #[test]
    fn test_filter_failures_are_distinguishable() {
        let none = ExportError::NoLayers {
            path: PathBuf::from("a.gdb"),
        };
        let excluded = ExportError::AllLayersExcluded {
            path: PathBuf::from("a.gdb"),
            excluded: 3,
        };
        assert_ne!(none.to_string(), excluded.to_string());
        assert!(excluded.to_string().contains("No layers to process"));
    }
}
