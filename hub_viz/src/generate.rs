//! Generation pipelines: forecast files, the options file and target files

use crate::data::{DataLoader, TabularData};
use crate::dates::{format_date, reference_date_from_today};
use crate::error::{Result, VizError};
use crate::forecast::{extract_forecast, ForecastOutput, ForecastQuery};
use crate::hub::HubConfig;
use crate::naming::json_file_name;
use crate::options::{assemble, PtcOptions};
use crate::target_data::extract_series;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

/// When an output file gets (re)written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Write every file
    Regenerate,
    /// Write a file when it is missing, or when it belongs to the most recent
    /// reference date and one of its inputs is newer than it. Older outputs
    /// are frozen.
    #[default]
    Incremental,
}

impl WritePolicy {
    pub fn from_regenerate_flag(regenerate: bool) -> Self {
        if regenerate {
            WritePolicy::Regenerate
        } else {
            WritePolicy::Incremental
        }
    }
}

/// Whether `policy` asks for `output` to be written
pub fn should_write(
    policy: WritePolicy,
    output: &Path,
    is_latest: bool,
    inputs: &[PathBuf],
) -> bool {
    match policy {
        WritePolicy::Regenerate => true,
        WritePolicy::Incremental => {
            let Some(written) = modified(output) else {
                return true;
            };
            is_latest
                && inputs
                    .iter()
                    .filter_map(|input| modified(input))
                    .any(|input| input > written)
        }
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|metadata| metadata.modified()).ok()
}

/// Write `value` as pretty-printed JSON
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text)?;
    debug!("wrote {}", path.display());
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(VizError::Config(format!("not a directory: {}", dir.display())));
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// One file per target, dimension tuple and reference date that has at
/// least one model's forecasts. Each model output file is loaded once per
/// reference date, and only when one of that date's files is to be written.
/// Returns the files written.
pub fn generate_forecast_json_files(
    hub: &HubConfig,
    out_dir: &Path,
    policy: WritePolicy,
) -> Result<Vec<PathBuf>> {
    ensure_dir(out_dir)?;
    let resolved = &hub.resolved;
    let date_column = resolved.viz_config.target_date_col_name.as_str();
    let columns = forecast_columns(hub, date_column);

    let submissions = submissions_by_date(hub);
    // the most recent round with a submission, not the last configured one
    let latest = submissions.keys().next_back().cloned();

    let mut written = Vec::new();
    let mut skipped = 0usize;
    for (reference_date, submitted) in &submissions {
        let inputs: Vec<PathBuf> = submitted.iter().map(|(_, path)| path.clone()).collect();
        let is_latest = latest.as_ref() == Some(reference_date);

        let mut pending = Vec::new();
        for model_task in &resolved.model_tasks {
            for tuple in &model_task.dimension_tuples {
                let file_name = json_file_name(&model_task.target_id, tuple, reference_date);
                let path = out_dir.join(file_name);
                if should_write(policy, &path, is_latest, &inputs) {
                    pending.push((model_task, tuple, path));
                } else {
                    skipped += 1;
                }
            }
        }
        if pending.is_empty() {
            debug!("forecast json files for {} are up to date", reference_date);
            continue;
        }

        let mut model_outputs: Vec<(&str, TabularData)> = Vec::new();
        for (model_id, path) in submitted {
            model_outputs.push((*model_id, DataLoader::load(path, Some(columns.as_slice()))?));
        }

        for (model_task, tuple, path) in pending {
            let query = ForecastQuery::new(model_task, date_column, tuple);
            let mut output = ForecastOutput::new();
            for (model_id, data) in &model_outputs {
                let fragment = extract_forecast(data, &query)?;
                if !fragment.is_empty() {
                    output.insert(model_id.to_string(), fragment);
                }
            }
            if output.is_empty() {
                continue;
            }

            write_json(&path, &output)?;
            written.push(path);
        }
    }

    info!(
        "forecast json files: {} written, {} unchanged, in {}",
        written.len(),
        skipped,
        out_dir.display()
    );
    Ok(written)
}

/// Model output files per reference date, for the dates that have any
fn submissions_by_date(hub: &HubConfig) -> BTreeMap<String, Vec<(&str, PathBuf)>> {
    let mut submissions = BTreeMap::new();
    for reference_date in hub.resolved.reference_dates() {
        let submitted: Vec<(&str, PathBuf)> = hub
            .registry
            .model_ids()
            .filter_map(|model_id| {
                hub.model_output_file_for_ref_date(model_id, &reference_date)
                    .map(|path| (model_id, path))
            })
            .collect();
        if submitted.is_empty() {
            debug!("no model outputs for {}", reference_date);
            continue;
        }
        submissions.insert(reference_date, submitted);
    }
    submissions
}

/// Columns loaded from model output files
fn forecast_columns<'a>(hub: &'a HubConfig, date_column: &'a str) -> Vec<&'a str> {
    let mut columns: Vec<&str> = Vec::new();
    for model_task in &hub.resolved.model_tasks {
        let no_values: &[String] = &[];
        for column in ForecastQuery::new(model_task, date_column, no_values).columns() {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
    }
    columns
}

/// The options document for `hub`, with availability taken from its model
/// output files
pub fn options_for_hub(hub: &HubConfig) -> Result<PtcOptions> {
    let mut availability = BTreeMap::new();
    for model_task in &hub.resolved.model_tasks {
        availability.insert(model_task.target_id.clone(), hub.available_dates(model_task)?);
    }
    assemble(&hub.resolved, &hub.registry, &availability)
}

/// Write the options document to `out_file`
pub fn generate_options_file(hub: &HubConfig, out_file: &Path) -> Result<PtcOptions> {
    if let Some(parent) = out_file.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    let options = options_for_hub(hub)?;
    write_json(out_file, &options)?;
    info!("options file written: {}", out_file.display());
    Ok(options)
}

/// Target series files.
///
/// Legacy truth files give one file per target and dimension tuple, named
/// with the reference date `today` belongs to. Time-series files give one
/// file per target, dimension tuple and available reference date, each cut
/// off at that date.
///
/// A missing configured legacy file is a `TargetDataNotFound` error. A
/// missing time-series file means the hub has no target data: nothing is
/// written.
pub fn generate_target_json_files(
    hub: &HubConfig,
    out_dir: &Path,
    policy: WritePolicy,
    today: NaiveDate,
) -> Result<Vec<PathBuf>> {
    let target_path = hub.target_data_path();
    let legacy = hub.viz_config().is_legacy_target_data();
    if !target_path.is_file() {
        if legacy {
            return Err(VizError::TargetDataNotFound(target_path));
        }
        info!("no target data file found: {}", target_path.display());
        return Ok(Vec::new());
    }

    ensure_dir(out_dir)?;
    let data = DataLoader::load(&target_path, None)?;
    let inputs = [target_path];

    let mut written = Vec::new();
    for model_task in &hub.resolved.model_tasks {
        let format = hub.target_data_format(model_task);
        let (reference_dates, cutoff) = if legacy {
            (vec![format_date(reference_date_from_today(today))], false)
        } else {
            (hub.available_dates(model_task)?, true)
        };
        let latest = reference_dates.last();

        for reference_date in &reference_dates {
            let is_latest = latest == Some(reference_date);
            for tuple in &model_task.dimension_tuples {
                let file_name = json_file_name(&model_task.target_id, tuple, reference_date);
                let path = out_dir.join(file_name);
                if !should_write(policy, &path, is_latest, &inputs) {
                    continue;
                }

                let as_of = cutoff.then_some(reference_date.as_str());
                let dims = &model_task.viz_dimensions;
                let Some(series) = extract_series(&data, &format, dims, tuple, as_of)? else {
                    continue;
                };
                write_json(&path, &series)?;
                written.push(path);
            }
        }
    }

    info!("target json files: {} written, in {}", written.len(), out_dir.display());
    Ok(written)
}
