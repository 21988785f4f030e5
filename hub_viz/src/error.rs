//! Error types for the hub_viz crate

use hub_schema::SchemaError;
use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the hub_viz crate
#[derive(Debug, Error)]
pub enum VizError {
    /// Hub directory or config file missing, or a hub document unreadable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config and task-space disagree, or the hub cannot be visualized
    #[error("Validation error: {0}")]
    Validation(String),

    /// Document decode or schema-level check failed
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A configured ground-truth file is absent on disk
    #[error("Target data file not found: {}", .0.display())]
    TargetDataNotFound(PathBuf),

    /// Neither a CSV nor a Parquet file
    #[error("Unsupported model output file type: {}. Only .csv and .parquet are supported", .0.display())]
    UnsupportedFormat(PathBuf),

    /// A loaded frame lacks a column the extractors need
    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    PolarsError(String),

    #[error("JSON error: {0}")]
    JsonError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, VizError>;

impl VizError {
    /// Whether the error is a startup configuration failure, raised before any
    /// output is written
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            VizError::Config(_) | VizError::Validation(_) | VizError::Schema(_)
        )
    }
}

impl From<PolarsError> for VizError {
    fn from(err: PolarsError) -> Self {
        VizError::PolarsError(err.to_string())
    }
}

impl From<serde_json::Error> for VizError {
    fn from(err: serde_json::Error) -> Self {
        VizError::JsonError(err.to_string())
    }
}
