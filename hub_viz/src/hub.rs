//! Hub loading and hub file layout

use crate::availability;
use crate::config::{self, ResolvedConfig};
use crate::error::{Result, VizError};
use crate::model_task::ModelTask;
use crate::registry::ModelRegistry;
use crate::target_data::TargetDataFormat;
use hub_schema::{ModelMetadataSchema, TaskSpace, VizConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const HUB_CONFIG_DIR: &str = "hub-config";
pub const TASKS_FILE: &str = "tasks.json";
pub const MODEL_METADATA_SCHEMA_FILE: &str = "model-metadata-schema.json";
pub const MODEL_METADATA_DIR: &str = "model-metadata";
pub const MODEL_OUTPUT_DIR: &str = "model-output";
pub const TARGET_DATA_DIR: &str = "target-data";

const MODEL_OUTPUT_EXTENSIONS: [&str; 2] = ["csv", "parquet"];

/// A hub resolved against a visualization config
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub hub_dir: PathBuf,
    pub resolved: ResolvedConfig,
    pub registry: ModelRegistry,
}

impl HubConfig {
    /// Read the hub's documents and `viz_config_file`, validate them against
    /// each other, and load the model registry
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(hub_dir: P, viz_config_file: Q) -> Result<Self> {
        let hub_dir = hub_dir.as_ref();
        let viz_config_file = viz_config_file.as_ref();
        if !hub_dir.is_dir() {
            return Err(VizError::Config(format!("hub dir not found: {}", hub_dir.display())));
        }
        if !viz_config_file.is_file() {
            return Err(VizError::Config(format!(
                "predtimechart config file not found: {}",
                viz_config_file.display()
            )));
        }

        let config_dir = hub_dir.join(HUB_CONFIG_DIR);
        let task_space = TaskSpace::from_json(&read_document(&config_dir.join(TASKS_FILE))?)?;
        let viz_config = VizConfig::from_yaml(&read_document(viz_config_file)?)?;

        let schema_path = config_dir.join(MODEL_METADATA_SCHEMA_FILE);
        let schema = if schema_path.is_file() {
            Some(ModelMetadataSchema::from_json(&read_document(&schema_path)?)?)
        } else {
            None
        };

        let resolved = config::resolve(&task_space, &viz_config, schema.as_ref())?;
        let registry = ModelRegistry::load(&hub_dir.join(MODEL_METADATA_DIR))?;
        info!(
            "loaded hub {}: {} model_task(s), {} model(s)",
            hub_dir.display(),
            resolved.model_tasks.len(),
            registry.len()
        );

        Ok(Self {
            hub_dir: hub_dir.to_path_buf(),
            resolved,
            registry,
        })
    }

    pub fn viz_config(&self) -> &VizConfig {
        &self.resolved.viz_config
    }

    /// `model-output/<id>/<date>-<id>.csv`, else the `.parquet` sibling, if
    /// either exists
    pub fn model_output_file_for_ref_date(
        &self,
        model_id: &str,
        reference_date: &str,
    ) -> Option<PathBuf> {
        let model_dir = self.hub_dir.join(MODEL_OUTPUT_DIR).join(model_id);
        MODEL_OUTPUT_EXTENSIONS
            .iter()
            .map(|ext| model_dir.join(format!("{}-{}.{}", reference_date, model_id, ext)))
            .find(|path| path.is_file())
    }

    /// Ground-truth file: the configured legacy file, or the time-series
    /// standard file
    pub fn target_data_path(&self) -> PathBuf {
        self.hub_dir
            .join(TARGET_DATA_DIR)
            .join(self.viz_config().target_data_file_name())
    }

    pub fn target_data_format(&self, model_task: &ModelTask) -> TargetDataFormat {
        TargetDataFormat::for_model_task(self.viz_config(), model_task)
    }

    /// Reference dates of `model_task` with forecasts in this hub
    pub fn available_dates(&self, model_task: &ModelTask) -> Result<Vec<String>> {
        availability::available_dates(model_task, &self.registry, |model_id, reference_date| {
            self.model_output_file_for_ref_date(model_id, reference_date)
        })
    }
}

fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| VizError::Config(format!("cannot read {}: {}", path.display(), e)))
}
