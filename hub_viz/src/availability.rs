//! Availability filter: which reference dates actually have forecasts

use crate::data::DataLoader;
use crate::error::{Result, VizError};
use crate::model_task::ModelTask;
use crate::registry::ModelRegistry;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::debug;

/// Sorted reference dates of `model_task` for which at least one model's
/// output file has a row for the task's target.
///
/// `locate` maps `(model_id, reference_date)` to that model's output file.
/// Never returns an empty list: with no data at all the earliest configured
/// reference date is returned alone.
pub fn available_dates<F>(
    model_task: &ModelTask,
    registry: &ModelRegistry,
    locate: F,
) -> Result<Vec<String>>
where
    F: Fn(&str, &str) -> Option<PathBuf>,
{
    let column = model_task.target_column.as_str();
    let mut found = BTreeSet::new();

    for reference_date in &model_task.reference_dates {
        for model_id in registry.model_ids() {
            let Some(path) = locate(model_id, reference_date) else {
                continue;
            };
            let data = DataLoader::load(&path, Some(&[column]))?;
            if data.contains_value(column, &model_task.target_id)? {
                found.insert(reference_date.clone());
                break;
            }
        }
    }

    if found.is_empty() {
        let first = model_task.first_reference_date().ok_or_else(|| {
            VizError::Validation(format!(
                "no reference dates for target '{}'",
                model_task.target_id
            ))
        })?;
        debug!(
            "no forecasts found for target '{}', falling back to {}",
            model_task.target_id, first
        );
        return Ok(vec![first.to_string()]);
    }

    Ok(found.into_iter().collect())
}
