//! Visualization config (`predtimechart-config.yml`)

use crate::{Result, SchemaError};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

/// Ground-truth file used when the config names none (time-series target data standard)
pub const TIME_SERIES_FILE_NAME: &str = "time-series.csv";

/// Dashboard settings for one hub.
///
/// A single flat shape: the advanced fields are optional and callers check for
/// their presence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VizConfig {
    /// 0-based index of the `rounds` entry to visualize
    pub rounds_idx: usize,
    /// 0-based index of a single `model_tasks` entry. When absent, every
    /// applicable entry of the round is used.
    #[serde(default)]
    pub model_tasks_idx: Option<usize>,
    pub reference_date_col_name: String,
    pub target_date_col_name: String,
    pub horizon_col_name: String,
    /// Model ids checked when the dashboard first loads
    pub initial_checked_models: Vec<String>,
    #[serde(default)]
    pub disclaimer: Option<String>,
    /// dimension -> value -> display text
    #[serde(default)]
    pub task_id_text: Option<BTreeMap<String, BTreeMap<String, String>>>,
    /// Legacy per-hub ground-truth file under `target-data/`
    #[serde(default)]
    pub target_data_file_name: Option<String>,
    #[serde(default)]
    pub initial_xaxis_range: Option<Vec<String>>,
}

impl VizConfig {
    /// Decode and check a config from YAML text
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: VizConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Field-level checks the decoder cannot express
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("reference_date_col_name", &self.reference_date_col_name),
            ("target_date_col_name", &self.target_date_col_name),
            ("horizon_col_name", &self.horizon_col_name),
        ] {
            non_empty(field, value)?;
        }
        if let Some(disclaimer) = &self.disclaimer {
            non_empty("disclaimer", disclaimer)?;
        }
        if let Some(file_name) = &self.target_data_file_name {
            non_empty("target_data_file_name", file_name)?;
        }

        let mut seen = HashSet::new();
        for model_id in &self.initial_checked_models {
            if !seen.insert(model_id) {
                return Err(SchemaError::Validation(format!(
                    "initial_checked_models has non-unique elements: '{}'",
                    model_id
                )));
            }
        }

        if let Some(range) = &self.initial_xaxis_range {
            if range.len() != 2 {
                return Err(SchemaError::Validation(format!(
                    "initial_xaxis_range must have exactly two dates, found {}",
                    range.len()
                )));
            }
        }

        Ok(())
    }

    /// The reference-date, target-date and horizon column names
    pub fn date_column_names(&self) -> [&str; 3] {
        [
            self.reference_date_col_name.as_str(),
            self.target_date_col_name.as_str(),
            self.horizon_col_name.as_str(),
        ]
    }

    /// Whether ground truth comes from a legacy per-hub file
    pub fn is_legacy_target_data(&self) -> bool {
        self.target_data_file_name.is_some()
    }

    /// File name to look for under `target-data/`
    pub fn target_data_file_name(&self) -> &str {
        self.target_data_file_name
            .as_deref()
            .unwrap_or(TIME_SERIES_FILE_NAME)
    }

    /// Display text for a dimension value, falling back to the value itself
    pub fn task_text<'a>(&'a self, dimension: &str, value: &'a str) -> &'a str {
        self.task_id_text
            .as_ref()
            .and_then(|text| text.get(dimension))
            .and_then(|values| values.get(value))
            .map(String::as_str)
            .unwrap_or(value)
    }
}

fn non_empty(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(SchemaError::Validation(format!(
            "{}: '' should be non-empty",
            field
        )));
    }
    Ok(())
}
