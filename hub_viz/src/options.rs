//! Options assembler: the dashboard's options document

use crate::config::ResolvedConfig;
use crate::error::{Result, VizError};
use crate::registry::ModelRegistry;
use serde::Serialize;
use std::collections::BTreeMap;

/// Interval widths offered by the dashboard, narrowest first
pub const INTERVALS: [&str; 3] = ["0%", "50%", "95%"];

/// The dashboard options object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PtcOptions {
    pub target_variables: Vec<TargetVariable>,
    pub initial_target_var: String,
    /// target id -> dimension -> selectable values
    pub task_ids: BTreeMap<String, BTreeMap<String, Vec<TaskIdOption>>>,
    pub initial_task_ids: BTreeMap<String, String>,
    pub intervals: Vec<String>,
    pub initial_interval: String,
    /// target id -> reference dates with data
    pub available_as_ofs: BTreeMap<String, Vec<String>>,
    pub initial_as_of: String,
    pub current_date: String,
    pub models: Vec<String>,
    pub initial_checked_models: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
    pub initial_xaxis_range: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetVariable {
    pub value: String,
    pub text: String,
    pub plot_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskIdOption {
    pub value: String,
    pub text: String,
}

/// Build the options document. `availability` maps target id to the dates
/// found by the availability filter; a target missing from it counts as
/// having none.
pub fn assemble(
    resolved: &ResolvedConfig,
    registry: &ModelRegistry,
    availability: &BTreeMap<String, Vec<String>>,
) -> Result<PtcOptions> {
    let config = &resolved.viz_config;
    let first = resolved
        .model_tasks
        .first()
        .ok_or_else(|| VizError::Validation("no model_task entries to visualize".to_string()))?;

    let target_variables = resolved
        .model_tasks
        .iter()
        .map(|model_task| TargetVariable {
            value: model_task.target_id.clone(),
            text: model_task.target_name.clone(),
            plot_text: model_task.target_name.clone(),
        })
        .collect();

    let task_ids: BTreeMap<String, BTreeMap<String, Vec<TaskIdOption>>> = resolved
        .model_tasks
        .iter()
        .map(|model_task| {
            let dimensions = model_task
                .dimension_values
                .iter()
                .map(|(dimension, values)| {
                    let options = values
                        .iter()
                        .map(|value| TaskIdOption {
                            value: value.clone(),
                            text: config.task_text(dimension, value).to_string(),
                        })
                        .collect();
                    (dimension.clone(), options)
                })
                .collect();
            (model_task.target_id.clone(), dimensions)
        })
        .collect();

    let initial_task_ids = first
        .dimension_values
        .iter()
        .filter_map(|(dimension, values)| Some((dimension.clone(), values.first()?.clone())))
        .collect();

    let mut available_as_ofs = BTreeMap::new();
    let mut initial_as_of: Option<String> = None;
    for model_task in &resolved.model_tasks {
        let dates = availability
            .get(&model_task.target_id)
            .cloned()
            .unwrap_or_default();
        let latest = dates
            .iter()
            .max()
            .map(String::as_str)
            .or_else(|| model_task.first_reference_date());
        if let Some(latest) = latest {
            if initial_as_of.as_deref().map_or(true, |current| latest > current) {
                initial_as_of = Some(latest.to_string());
            }
        }
        available_as_ofs.insert(model_task.target_id.clone(), dates);
    }
    let initial_as_of = initial_as_of
        .ok_or_else(|| VizError::Validation("no reference dates to offer".to_string()))?;

    let mut models: Vec<String> = registry
        .model_ids()
        .filter(|model_id| {
            registry.is_designated(model_id)
                || config.initial_checked_models.iter().any(|checked| checked == model_id)
        })
        .map(str::to_string)
        .collect();
    models.sort();

    Ok(PtcOptions {
        target_variables,
        initial_target_var: first.target_id.clone(),
        task_ids,
        initial_task_ids,
        intervals: INTERVALS.iter().map(|interval| interval.to_string()).collect(),
        initial_interval: INTERVALS[INTERVALS.len() - 1].to_string(),
        available_as_ofs,
        current_date: initial_as_of.clone(),
        initial_as_of,
        models,
        initial_checked_models: config.initial_checked_models.clone(),
        disclaimer: config.disclaimer.clone(),
        initial_xaxis_range: config.initial_xaxis_range.clone(),
    })
}
