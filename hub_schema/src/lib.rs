//! # Hub Schema
//!
//! Typed views of the documents a hubverse hub ships: the task-space
//! (`hub-config/tasks.json`), the model metadata schema and per-model metadata
//! records, plus the visualization config that drives dashboard generation.
//! Documents are decoded once, checked, and handed on as plain structs so that
//! nothing downstream walks raw nested maps.

use thiserror::Error;

pub mod model_metadata;
pub mod task_space;
pub mod viz_config;

pub use model_metadata::{ModelMetadata, ModelMetadataSchema};
pub use task_space::{
    ModelTaskDef, OutputTypeDef, OutputTypeIds, Round, TargetMetadata, TaskIdValues, TaskSpace,
};
pub use viz_config::VizConfig;

/// Errors that can occur while decoding or checking hub documents
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for hub document operations
pub type Result<T> = std::result::Result<T, SchemaError>;

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for SchemaError {
    fn from(err: serde_yaml::Error) -> Self {
        SchemaError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_errors_keep_decoder_message() {
        let err: SchemaError = serde_json::from_str::<TaskSpace>("{}").unwrap_err().into();
        assert!(matches!(err, SchemaError::Parse(_)));
        assert!(err.to_string().contains("rounds"));
    }
}
