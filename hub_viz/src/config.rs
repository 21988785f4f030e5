//! Config resolution: cross-checks a visualization config against a hub's
//! task-space and model metadata schema, then derives the model-tasks to
//! visualize.
//!
//! Checks run in a fixed order and the first violation wins:
//!
//! 1. the config passes its own field checks
//! 2. `rounds_idx` / `model_tasks_idx` point at existing entries
//! 3. every selected entry has the reference-date, target-date and horizon task ids
//! 4. every selected entry offers `quantile` with the required levels
//! 5. every selected entry has exactly one step-ahead `target_metadata` entry
//!    with exactly one `target_keys` entry
//! 6. the model metadata schema requires a boolean `designated_model`
//! 7. all selected entries share the same task ids

use crate::error::{Result, VizError};
use crate::forecast::QUANTILE_LEVELS;
use crate::model_task::ModelTask;
use hub_schema::model_metadata::DESIGNATED_MODEL_FIELD;
use hub_schema::{ModelMetadataSchema, ModelTaskDef, TaskSpace, VizConfig};
use std::collections::BTreeSet;

/// A visualization config resolved against a task-space
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub viz_config: VizConfig,
    /// In task-space order
    pub model_tasks: Vec<ModelTask>,
}

impl ResolvedConfig {
    /// Sorted union of every model-task's reference dates
    pub fn reference_dates(&self) -> Vec<String> {
        self.model_tasks
            .iter()
            .flat_map(|model_task| model_task.reference_dates.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// The model-task visualizing `target_id`
    pub fn model_task(&self, target_id: &str) -> Option<&ModelTask> {
        self.model_tasks
            .iter()
            .find(|model_task| model_task.target_id == target_id)
    }

    /// Dimensions shared by every model-task
    pub fn viz_dimensions(&self) -> &[String] {
        self.model_tasks
            .first()
            .map(|model_task| model_task.viz_dimensions.as_slice())
            .unwrap_or(&[])
    }
}

/// Validate `viz_config` against `task_space` and `schema` and derive the
/// model-tasks to visualize
pub fn resolve(
    task_space: &TaskSpace,
    viz_config: &VizConfig,
    schema: Option<&ModelMetadataSchema>,
) -> Result<ResolvedConfig> {
    viz_config.validate()?;

    let selected = select_model_tasks(task_space, viz_config)?;
    for (idx, definition) in &selected {
        check_task_id_columns(*idx, definition, viz_config)?;
        check_quantile_levels(*idx, definition)?;
        check_target_metadata(*idx, definition)?;
    }
    check_model_metadata_schema(schema)?;
    check_same_task_ids(&selected)?;

    let model_tasks = selected
        .iter()
        .map(|(idx, definition)| ModelTask::new(*idx, definition, viz_config))
        .collect::<Result<Vec<_>>>()?;
    check_model_task_consistency(&model_tasks)?;

    Ok(ResolvedConfig {
        viz_config: viz_config.clone(),
        model_tasks,
    })
}

/// The configured `model_tasks` entry, or every entry of the round offering
/// step-ahead quantile forecasts
fn select_model_tasks<'a>(
    task_space: &'a TaskSpace,
    viz_config: &VizConfig,
) -> Result<Vec<(usize, &'a ModelTaskDef)>> {
    let round = task_space.rounds.get(viz_config.rounds_idx).ok_or_else(|| {
        VizError::Validation(format!(
            "invalid rounds_idx: #rounds={}, rounds_idx={}",
            task_space.rounds.len(),
            viz_config.rounds_idx
        ))
    })?;

    if let Some(idx) = viz_config.model_tasks_idx {
        let definition = round.model_tasks.get(idx).ok_or_else(|| {
            VizError::Validation(format!(
                "invalid model_tasks_idx: #model_tasks={}, model_tasks_idx={}",
                round.model_tasks.len(),
                idx
            ))
        })?;
        return Ok(vec![(idx, definition)]);
    }

    let applicable: Vec<(usize, &ModelTaskDef)> = round
        .model_tasks
        .iter()
        .enumerate()
        .filter(|(_, definition)| definition.has_quantile() && definition.is_step_ahead())
        .collect();
    if applicable.is_empty() {
        return Err(VizError::Validation(format!(
            "no applicable model_task entries were found in rounds[{}]",
            viz_config.rounds_idx
        )));
    }
    Ok(applicable)
}

fn check_task_id_columns(
    idx: usize,
    definition: &ModelTaskDef,
    viz_config: &VizConfig,
) -> Result<()> {
    let required: BTreeSet<&str> = viz_config.date_column_names().into_iter().collect();
    let found: BTreeSet<&str> = definition.task_ids.keys().map(String::as_str).collect();
    if !required.is_subset(&found) {
        return Err(VizError::Validation(format!(
            "model_tasks[{}]: some required columns are missing. required={:?}, found={:?}",
            idx, required, found
        )));
    }
    Ok(())
}

fn check_quantile_levels(idx: usize, definition: &ModelTaskDef) -> Result<()> {
    if !definition.has_quantile() {
        return Err(VizError::Validation(format!(
            "model_tasks[{}]: no quantile output_type found. found types: {:?}",
            idx,
            definition.output_type.keys().collect::<Vec<_>>()
        )));
    }

    let levels = definition.quantile_levels();
    let missing: Vec<f64> = QUANTILE_LEVELS
        .iter()
        .copied()
        .filter(|required| !levels.iter().any(|level| (level - required).abs() < 1e-9))
        .collect();
    if !missing.is_empty() {
        return Err(VizError::Validation(format!(
            "model_tasks[{}]: some quantile output_type_ids are missing. required={:?}, missing={:?}",
            idx, QUANTILE_LEVELS, missing
        )));
    }
    Ok(())
}

fn check_target_metadata(idx: usize, definition: &ModelTaskDef) -> Result<()> {
    let count = definition.target_metadata.len();
    if count != 1 {
        return Err(VizError::Validation(format!(
            "model_tasks[{}]: not exactly one target_metadata object: {}",
            idx, count
        )));
    }

    let metadata = &definition.target_metadata[0];
    let key_count = metadata.target_keys.as_ref().map_or(0, |keys| keys.len());
    if key_count != 1 {
        return Err(VizError::Validation(format!(
            "model_tasks[{}]: not exactly one target_metadata target_keys entry: {:?}",
            idx, metadata.target_keys
        )));
    }

    if !metadata.is_step_ahead {
        return Err(VizError::Validation(format!(
            "model_tasks[{}]: target_metadata is_step_ahead must be true",
            idx
        )));
    }
    Ok(())
}

fn check_model_metadata_schema(schema: Option<&ModelMetadataSchema>) -> Result<()> {
    let schema = schema
        .ok_or_else(|| VizError::Validation("model metadata schema not found".to_string()))?;

    if !schema.is_required(DESIGNATED_MODEL_FIELD) {
        return Err(VizError::Validation(format!(
            "'{}' not found in model metadata schema's 'required' section",
            DESIGNATED_MODEL_FIELD
        )));
    }
    match schema.property_type(DESIGNATED_MODEL_FIELD) {
        Some("boolean") | None => Ok(()),
        Some(other) => Err(VizError::Validation(format!(
            "'{}' must be a boolean in the model metadata schema, found type '{}'",
            DESIGNATED_MODEL_FIELD, other
        ))),
    }
}

fn check_same_task_ids(selected: &[(usize, &ModelTaskDef)]) -> Result<()> {
    let key_sets: BTreeSet<BTreeSet<&str>> = selected
        .iter()
        .map(|(_, definition)| definition.task_ids.keys().map(String::as_str).collect())
        .collect();
    if key_sets.len() > 1 {
        return Err(VizError::Validation(format!(
            "not all model_task entries have the same task_ids: {:?}",
            key_sets
        )));
    }
    Ok(())
}

/// Dimensions must agree across model-tasks, and each target may be
/// visualized only once
fn check_model_task_consistency(model_tasks: &[ModelTask]) -> Result<()> {
    if let Some(first) = model_tasks.first() {
        for model_task in &model_tasks[1..] {
            if model_task.viz_dimensions != first.viz_dimensions {
                return Err(VizError::Validation(format!(
                    "model_tasks[{}] and model_tasks[{}] have different visualization dimensions: {:?} vs {:?}",
                    first.model_task_idx,
                    model_task.model_task_idx,
                    first.viz_dimensions,
                    model_task.viz_dimensions
                )));
            }
        }
    }

    let mut seen = BTreeSet::new();
    for model_task in model_tasks {
        if !seen.insert(model_task.target_id.as_str()) {
            return Err(VizError::Validation(format!(
                "model_tasks[{}]: target id '{}' is used by more than one model_task entry",
                model_task.model_task_idx, model_task.target_id
            )));
        }
    }
    Ok(())
}
