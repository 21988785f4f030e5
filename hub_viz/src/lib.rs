//! # Hub Viz
//!
//! Turns a hubverse forecast hub into the JSON files a predtimechart
//! dashboard fetches.
//!
//! ## Features
//!
//! - Cross-validation of a visualization config against the hub's task-space
//! - Enumeration of visualization dimensions and their value tuples
//! - Forecast files: one per target, dimension tuple and reference date
//! - Target (ground truth) files for legacy truth files and the time-series
//!   standard, with `as_of` versioning
//! - The dashboard options document
//! - Incremental regeneration that leaves frozen outputs alone
//!
//! ## Quick Start
//!
//! ```no_run
//! use hub_viz::{generate_forecast_json_files, generate_options_file, HubConfig, WritePolicy};
//! use std::path::Path;
//!
//! let hub = HubConfig::load("example-complex-forecast-hub", "predtimechart-config.yml")?;
//! let out_dir = Path::new("out/forecasts");
//! let written = generate_forecast_json_files(&hub, out_dir, WritePolicy::Incremental)?;
//! let options = generate_options_file(&hub, Path::new("out/predtimechart-options.json"))?;
//! println!("{} files, initial as-of {}", written.len(), options.initial_as_of);
//! # Ok::<(), hub_viz::VizError>(())
//! ```

pub mod availability;
pub mod config;
pub mod data;
pub mod dates;
pub mod error;
pub mod forecast;
pub mod generate;
pub mod hub;
pub mod logging;
pub mod model_task;
pub mod naming;
pub mod options;
pub mod registry;
pub mod target_data;

// Re-export commonly used types
pub use crate::config::{resolve, ResolvedConfig};
pub use crate::data::{DataLoader, TabularData};
pub use crate::error::{Result, VizError};
pub use crate::forecast::{extract_forecast, ForecastFragment, ForecastQuery, QUANTILE_LEVELS};
pub use crate::generate::{
    generate_forecast_json_files, generate_options_file, generate_target_json_files,
    options_for_hub, WritePolicy,
};
pub use crate::hub::HubConfig;
pub use crate::model_task::ModelTask;
pub use crate::naming::{json_file_name, sanitize};
pub use crate::options::PtcOptions;
pub use crate::registry::ModelRegistry;
pub use crate::target_data::{extract_series, TargetDataFormat, TargetSeries};
