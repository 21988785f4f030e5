//! Ground-truth series extraction, in the dashboard's truth wire format

use crate::data::TabularData;
use crate::error::Result;
use crate::model_task::ModelTask;
use hub_schema::VizConfig;
use serde::Serialize;

/// Legacy per-hub truth file columns
pub const LEGACY_DATE_COLUMN: &str = "date";
pub const LEGACY_VALUE_COLUMN: &str = "value";
/// Time-series standard columns
pub const OBSERVATION_COLUMN: &str = "observation";
pub const AS_OF_COLUMN: &str = "as_of";

/// Which ground-truth layout a hub uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetDataFormat {
    /// A hub-specific file with `date` and `value` columns
    Legacy,
    /// `target-data/time-series.csv`: dates under the hub's target-date
    /// column, values under `observation`, optionally versioned by `as_of`
    /// and holding several targets
    TimeSeries {
        date_column: String,
        target_column: String,
        target_id: String,
    },
}

impl TargetDataFormat {
    pub fn for_model_task(viz_config: &VizConfig, model_task: &ModelTask) -> Self {
        if viz_config.is_legacy_target_data() {
            TargetDataFormat::Legacy
        } else {
            TargetDataFormat::TimeSeries {
                date_column: viz_config.target_date_col_name.clone(),
                target_column: model_task.target_column.clone(),
                target_id: model_task.target_id.clone(),
            }
        }
    }

    pub fn date_column(&self) -> &str {
        match self {
            TargetDataFormat::Legacy => LEGACY_DATE_COLUMN,
            TargetDataFormat::TimeSeries { date_column, .. } => date_column,
        }
    }

    pub fn value_column(&self) -> &str {
        match self {
            TargetDataFormat::Legacy => LEGACY_VALUE_COLUMN,
            TargetDataFormat::TimeSeries { .. } => OBSERVATION_COLUMN,
        }
    }
}

/// Observed values sorted by date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetSeries {
    pub date: Vec<String>,
    pub y: Vec<Option<f64>>,
}

/// Extract the series for one dimension tuple.
///
/// In time-series mode, rows are limited to the model-task's target and, if
/// the frame is versioned and `as_of_cutoff` is given, to the latest `as_of`
/// on or before the cutoff. Returns `None` when no version qualifies or no
/// rows remain.
pub fn extract_series(
    data: &TabularData,
    format: &TargetDataFormat,
    dimension_columns: &[String],
    dimension_values: &[String],
    as_of_cutoff: Option<&str>,
) -> Result<Option<TargetSeries>> {
    let mut rows = data.clone();

    if let TargetDataFormat::TimeSeries { target_column, target_id, .. } = format {
        if rows.has_column(target_column) {
            rows = rows.filter_eq(target_column, target_id)?;
        }
        match as_of_cutoff {
            Some(cutoff) if rows.has_column(AS_OF_COLUMN) => match latest_as_of(&rows, cutoff)? {
                Some(as_of) => rows = rows.filter_eq(AS_OF_COLUMN, &as_of)?,
                None => return Ok(None),
            },
            _ => {}
        }
    }

    for (column, value) in dimension_columns.iter().zip(dimension_values) {
        if rows.has_column(column) {
            rows = rows.filter_eq(column, value)?;
        }
    }
    if rows.is_empty() {
        return Ok(None);
    }

    let dates = rows.column_as_strings(format.date_column())?;
    let values = rows.column_as_f64(format.value_column())?;
    let mut points: Vec<(String, Option<f64>)> = dates
        .into_iter()
        .zip(values)
        .filter_map(|(date, value)| date.map(|date| (date, value)))
        .collect();
    if points.is_empty() {
        return Ok(None);
    }
    points.sort_by(|a, b| a.0.cmp(&b.0));

    let (date, y): (Vec<String>, Vec<Option<f64>>) = points.into_iter().unzip();
    Ok(Some(TargetSeries { date, y }))
}

/// Largest `as_of` whose date part is on or before `cutoff`
fn latest_as_of(rows: &TabularData, cutoff: &str) -> Result<Option<String>> {
    Ok(rows
        .column_as_strings(AS_OF_COLUMN)?
        .into_iter()
        .flatten()
        .filter(|as_of| date_part(as_of) <= cutoff)
        .max())
}

fn date_part(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}
