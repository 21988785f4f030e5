//! # Hub Dashboard
//!
//! Umbrella crate for the hub dashboard tools:
//!
//! - [`hub_schema`]: typed hub documents (task-space, model metadata,
//!   visualization config)
//! - [`hub_viz`]: config resolution, forecast/target extraction and the
//!   predtimechart JSON generators
//!
//! ## Example
//!
//! ```
//! use hub_dashboard_workspace::hub_viz::sanitize;
//!
//! assert_eq!(sanitize("wk inc flu hosp"), "wk-inc-flu-hosp");
//! ```

pub use hub_schema;
pub use hub_viz;

pub use hub_schema::{TaskSpace, VizConfig};
pub use hub_viz::{HubConfig, VizError, WritePolicy};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports() {
        let config = VizConfig::from_yaml(
            "rounds_idx: 0\nreference_date_col_name: reference_date\ntarget_date_col_name: target_end_date\nhorizon_col_name: horizon\ninitial_checked_models: []\n",
        )
        .unwrap();
        assert_eq!(config.rounds_idx, 0);
        assert_eq!(WritePolicy::default(), WritePolicy::Incremental);
        assert_eq!(hub_viz::QUANTILE_LEVELS.len(), 5);
    }
}
