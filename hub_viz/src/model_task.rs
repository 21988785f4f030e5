//! Visualization view of one task-space `model_tasks` entry

use crate::error::{Result, VizError};
use hub_schema::{ModelTaskDef, VizConfig};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};

/// A resolved model-task: its target, the dimensions the dashboard lets users
/// pick from, every combination of their values, and the configured reference
/// dates.
///
/// `viz_dimensions` is sorted, and every tuple in `dimension_tuples` lists its
/// values in that same order. Consumers index into tuples positionally.
#[derive(Debug, Clone)]
pub struct ModelTask {
    /// Index of the originating `model_tasks` entry within the round
    pub model_task_idx: usize,
    /// Target identifier, e.g. "wk inc flu hosp"
    pub target_id: String,
    /// Human-readable target name
    pub target_name: String,
    /// Column holding the target identifier, e.g. "target"
    pub target_column: String,
    pub viz_dimensions: Vec<String>,
    /// dimension -> sorted, de-duplicated union of required and optional values
    pub dimension_values: BTreeMap<String, Vec<String>>,
    pub dimension_tuples: Vec<Vec<String>>,
    /// Sorted, de-duplicated reference dates
    pub reference_dates: Vec<String>,
}

impl ModelTask {
    /// Derive the visualization view of an already validated entry
    pub fn new(
        model_task_idx: usize,
        definition: &ModelTaskDef,
        config: &VizConfig,
    ) -> Result<Self> {
        let (target_column, target_id) = definition.target_key().ok_or_else(|| {
            VizError::Validation(format!(
                "model_tasks[{}]: no target_metadata target_keys entry",
                model_task_idx
            ))
        })?;
        let target_name = definition
            .target_metadata
            .first()
            .map(|meta| meta.target_name.clone())
            .unwrap_or_default();

        let excluded: BTreeSet<&str> = config
            .date_column_names()
            .into_iter()
            .chain(std::iter::once(target_column))
            .collect();
        let viz_dimensions: Vec<String> = definition
            .task_ids
            .keys()
            .filter(|name| !excluded.contains(name.as_str()))
            .cloned()
            .collect();

        let dimension_values: BTreeMap<String, Vec<String>> = viz_dimensions
            .iter()
            .map(|dimension| {
                let values = definition.task_ids[dimension].all_values();
                (dimension.clone(), sorted_unique(values))
            })
            .collect();
        let dimension_tuples = cartesian_product(&viz_dimensions, &dimension_values);

        let reference_dates = definition
            .task_ids
            .get(&config.reference_date_col_name)
            .map(|values| sorted_unique(values.all_values()))
            .unwrap_or_default();
        if reference_dates.is_empty() {
            return Err(VizError::Validation(format!(
                "model_tasks[{}]: no reference dates found under '{}'",
                model_task_idx, config.reference_date_col_name
            )));
        }

        Ok(Self {
            model_task_idx,
            target_id: target_id.to_string(),
            target_name,
            target_column: target_column.to_string(),
            viz_dimensions,
            dimension_values,
            dimension_tuples,
            reference_dates,
        })
    }

    /// Earliest configured reference date
    pub fn first_reference_date(&self) -> Option<&str> {
        self.reference_dates.first().map(String::as_str)
    }
}

fn sorted_unique(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values.dedup();
    values
}

/// Every combination of dimension values, in `dimensions` order. No dimensions
/// yields a single empty tuple.
fn cartesian_product(
    dimensions: &[String],
    values: &BTreeMap<String, Vec<String>>,
) -> Vec<Vec<String>> {
    if dimensions.is_empty() {
        return vec![Vec::new()];
    }
    dimensions
        .iter()
        .map(|dimension| values.get(dimension).into_iter().flatten().cloned())
        .multi_cartesian_product()
        .collect()
}
