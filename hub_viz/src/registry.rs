//! Model registry: the hub's models and their metadata

use crate::error::{Result, VizError};
use hub_schema::ModelMetadata;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Model id -> metadata, iterated in model id order
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, ModelMetadata>,
}

impl ModelRegistry {
    /// Read every `*.yml` / `*.yaml` file in `dir`. A missing directory gives
    /// an empty registry.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            warn!("model metadata dir not found: {}", dir.display());
            return Ok(Self::default());
        }

        let mut models = BTreeMap::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_metadata = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| ext == "yml" || ext == "yaml");
            if !is_metadata {
                continue;
            }

            let text = fs::read_to_string(&path)?;
            let metadata = ModelMetadata::from_yaml(&text).map_err(|e| {
                VizError::Config(format!("invalid model metadata file {}: {}", path.display(), e))
            })?;
            debug!("loaded model metadata: {}", path.display());
            models.insert(metadata.model_id(), metadata);
        }

        Ok(Self { models })
    }

    pub fn from_models<I: IntoIterator<Item = ModelMetadata>>(models: I) -> Self {
        Self {
            models: models
                .into_iter()
                .map(|metadata| (metadata.model_id(), metadata))
                .collect(),
        }
    }

    pub fn model_ids(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn get(&self, model_id: &str) -> Option<&ModelMetadata> {
        self.models.get(model_id)
    }

    pub fn is_designated(&self, model_id: &str) -> bool {
        self.get(model_id).map_or(false, |metadata| metadata.designated_model)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_yml_and_yaml() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("Flusight-baseline.yml"),
            "team_abbr: Flusight\nmodel_abbr: baseline\ndesignated_model: true\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("MOBS-GLEAM_FLUH.yaml"),
            "team_abbr: MOBS\nmodel_abbr: GLEAM_FLUH\ndesignated_model: false\n",
        )
        .unwrap();
        fs::write(dir.path().join("README.md"), "not metadata").unwrap();

        let registry = ModelRegistry::load(dir.path()).unwrap();
        assert_eq!(
            registry.model_ids().collect::<Vec<_>>(),
            vec!["Flusight-baseline", "MOBS-GLEAM_FLUH"]
        );
        assert!(registry.is_designated("Flusight-baseline"));
        assert!(!registry.is_designated("MOBS-GLEAM_FLUH"));
        assert!(!registry.is_designated("nobody-here"));
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        let registry = ModelRegistry::load(&dir.path().join("model-metadata")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalid_metadata_names_the_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.yml"), "team_abbr: PSI\n").unwrap();

        let err = ModelRegistry::load(dir.path()).unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("broken.yml"), "{}", err);
    }
}
