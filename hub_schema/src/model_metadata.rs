//! Model metadata records and the hub's model metadata schema

use crate::Result;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Field flagging a model for default visibility in the dashboard
pub const DESIGNATED_MODEL_FIELD: &str = "designated_model";

/// The parts of `hub-config/model-metadata-schema.json` the dashboard checks
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelMetadataSchema {
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl ModelMetadataSchema {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Whether `field` is required. Only fields present in `required` count.
    pub fn is_required(&self, field: &str) -> bool {
        self.required.iter().any(|name| name == field)
    }

    /// Declared JSON type of `field`, if the schema declares one
    pub fn property_type(&self, field: &str) -> Option<&str> {
        self.properties
            .get(field)
            .and_then(|property| property.get("type"))
            .and_then(Value::as_str)
    }
}

/// One `model-metadata/*.yml` record
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelMetadata {
    pub team_abbr: String,
    pub model_abbr: String,
    #[serde(default)]
    pub designated_model: bool,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
}

impl ModelMetadata {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Hub model id: `<team_abbr>-<model_abbr>`
    pub fn model_id(&self) -> String {
        format!("{}-{}", self.team_abbr, self.model_abbr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_metadata_schema() {
        let schema = ModelMetadataSchema::from_json(
            r#"{
                "$schema": "http://json-schema.org/draft-07/schema",
                "type": "object",
                "properties": {
                    "team_abbr": {"type": "string"},
                    "designated_model": {"description": "Team-designated model", "type": "boolean"}
                },
                "required": ["team_abbr", "model_abbr", "designated_model"]
            }"#,
        )
        .unwrap();
        assert!(schema.is_required(DESIGNATED_MODEL_FIELD));
        assert_eq!(schema.property_type(DESIGNATED_MODEL_FIELD), Some("boolean"));
        assert!(!schema.is_required("license"));
        assert_eq!(schema.property_type("license"), None);
    }

    #[test]
    fn test_model_metadata_record() {
        let metadata = ModelMetadata::from_yaml(
            "team_name: \"CDC FluSight\"\nteam_abbr: \"Flusight\"\nmodel_abbr: \"baseline\"\ndesignated_model: true\nlicense: \"CC-BY-4.0\"\n",
        )
        .unwrap();
        assert_eq!(metadata.model_id(), "Flusight-baseline");
        assert!(metadata.designated_model);
        assert_eq!(metadata.team_name.as_deref(), Some("CDC FluSight"));
    }

    #[test]
    fn test_model_metadata_requires_abbreviations() {
        let err =
            ModelMetadata::from_yaml("team_abbr: \"PSI\"\ndesignated_model: false\n").unwrap_err();
        assert!(err.to_string().contains("model_abbr"));
    }
}
