//! Hub task-space (`hub-config/tasks.json`)
//!
//! Only the parts of the hubverse schema the dashboard reads are typed here;
//! everything else in the document (submission windows, units, ...) is ignored
//! on decode.

use crate::Result;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Output type name the dashboard visualizes
pub const QUANTILE_OUTPUT_TYPE: &str = "quantile";

/// A hub's full task-space: an ordered list of rounds
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSpace {
    pub rounds: Vec<Round>,
}

/// One `rounds` entry
#[derive(Debug, Clone, Deserialize)]
pub struct Round {
    #[serde(default)]
    pub round_id: Option<String>,
    pub model_tasks: Vec<ModelTaskDef>,
}

/// One `model_tasks` entry under a round
#[derive(Debug, Clone, Deserialize)]
pub struct ModelTaskDef {
    pub task_ids: BTreeMap<String, TaskIdValues>,
    pub output_type: BTreeMap<String, OutputTypeDef>,
    #[serde(default)]
    pub target_metadata: Vec<TargetMetadata>,
}

/// Allowed values of one task id. Either list may be `null` in the document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskIdValues {
    #[serde(default, deserialize_with = "scalars_as_strings")]
    pub required: Option<Vec<String>>,
    #[serde(default, deserialize_with = "scalars_as_strings")]
    pub optional: Option<Vec<String>>,
}

/// One `output_type` entry. Sample output types carry no `output_type_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputTypeDef {
    #[serde(default)]
    pub output_type_id: Option<OutputTypeIds>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputTypeIds {
    #[serde(default)]
    pub required: Option<Vec<Value>>,
    #[serde(default)]
    pub optional: Option<Vec<Value>>,
}

/// One `target_metadata` entry
#[derive(Debug, Clone, Deserialize)]
pub struct TargetMetadata {
    #[serde(default)]
    pub target_id: Option<String>,
    pub target_name: String,
    #[serde(default)]
    pub target_units: Option<String>,
    #[serde(default)]
    pub target_keys: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub target_type: Option<String>,
    pub is_step_ahead: bool,
    #[serde(default)]
    pub time_unit: Option<String>,
}

impl TaskSpace {
    /// Decode a task-space from `tasks.json` text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl TaskIdValues {
    /// Union of the required and optional values, required first, duplicates kept
    pub fn all_values(&self) -> Vec<String> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .flatten()
            .cloned()
            .collect()
    }
}

impl OutputTypeIds {
    /// Required ids that read as numbers. Hubs encode quantile levels either as
    /// JSON numbers or as numeric strings.
    pub fn required_levels(&self) -> Vec<f64> {
        self.required
            .iter()
            .flatten()
            .filter_map(|value| match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .collect()
    }
}

impl ModelTaskDef {
    /// Whether this entry offers the `quantile` output type
    pub fn has_quantile(&self) -> bool {
        self.output_type.contains_key(QUANTILE_OUTPUT_TYPE)
    }

    /// Required quantile levels, empty when there is no quantile output type
    pub fn quantile_levels(&self) -> Vec<f64> {
        self.output_type
            .get(QUANTILE_OUTPUT_TYPE)
            .and_then(|def| def.output_type_id.as_ref())
            .map(OutputTypeIds::required_levels)
            .unwrap_or_default()
    }

    /// `is_step_ahead` of the first target metadata entry
    pub fn is_step_ahead(&self) -> bool {
        self.target_metadata
            .first()
            .map(|meta| meta.is_step_ahead)
            .unwrap_or(false)
    }

    /// The single `(column, target id)` pair of the first target metadata entry
    pub fn target_key(&self) -> Option<(&str, &str)> {
        self.target_metadata
            .first()
            .and_then(|meta| meta.target_keys.as_ref())
            .and_then(|keys| keys.iter().next())
            .map(|(column, id)| (column.as_str(), id.as_str()))
    }
}

fn scalars_as_strings<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    values
        .map(|values| {
            values
                .iter()
                .map(|value| match value {
                    Value::String(s) => Ok(s.clone()),
                    Value::Number(n) => Ok(n.to_string()),
                    Value::Bool(b) => Ok(b.to_string()),
                    other => Err(de::Error::custom(format!(
                        "task id value is not a scalar: {}",
                        other
                    ))),
                })
                .collect::<std::result::Result<Vec<String>, D::Error>>()
        })
        .transpose()
}
