//! Error types for Pointer Flux

use thiserror::Error;

/// Errors that can occur while loading, segmenting, wrangling or tensorizing captures
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Segmentation error: {0}")]
    SegmentationError(String),

    #[error("Cannot convert cell at row {row}, column '{column}' to a number: {message}")]
    ConversionError {
        row: usize,
        column: String,
        message: String,
    },

    #[error("Index {index} out of range for store with {len} files")]
    IndexError { index: usize, len: usize },

    #[error("Stage '{stage}' expected {expected} but received {found}")]
    StageMismatch {
        stage: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Shape error: {0}")]
    ShapeError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ComputeError {
    /// True for the structural data errors that abort a single capture file
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            ComputeError::SchemaError(_)
                | ComputeError::SegmentationError(_)
                | ComputeError::ConversionError { .. }
        )
    }
}
