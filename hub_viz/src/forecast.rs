//! Forecast extraction: one model's quantile forecasts for one target and
//! dimension tuple, in the dashboard's forecast wire format

use crate::data::TabularData;
use crate::error::Result;
use crate::model_task::ModelTask;
use serde::Serialize;
use std::collections::BTreeMap;

const LEVEL_COUNT: usize = 5;

/// Quantile levels the dashboard draws its intervals from
pub const QUANTILE_LEVELS: [f64; LEVEL_COUNT] = [0.025, 0.25, 0.5, 0.75, 0.975];

/// Hubverse model output column names
pub const OUTPUT_TYPE_COLUMN: &str = "output_type";
pub const OUTPUT_TYPE_ID_COLUMN: &str = "output_type_id";
pub const VALUE_COLUMN: &str = "value";

const QUANTILE: &str = "quantile";
const LEVEL_TOLERANCE: f64 = 1e-9;

/// Per-model forecast data:
///
/// ```json
/// {"target_end_date": ["2022-10-22", "2022-10-29"],
///  "q0.025": [1114.0, 882.0], "q0.25": [...], "q0.5": [...], "q0.75": [...], "q0.975": [...]}
/// ```
///
/// Every `q<level>` array is aligned with `target_end_date`. A level missing
/// for some date is `null` at that position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForecastFragment {
    pub target_end_date: Vec<String>,
    #[serde(flatten)]
    pub quantiles: BTreeMap<String, Vec<Option<f64>>>,
}

impl ForecastFragment {
    pub fn is_empty(&self) -> bool {
        self.target_end_date.is_empty()
    }

    /// Values for one quantile level, e.g. `fragment.level(0.5)`
    pub fn level(&self, level: f64) -> Option<&[Option<f64>]> {
        self.quantiles.get(&level_key(level)).map(Vec::as_slice)
    }
}

/// Forecast file contents: model id -> fragment
pub type ForecastOutput = BTreeMap<String, ForecastFragment>;

/// `q` followed by the level, e.g. "q0.025"
pub fn level_key(level: f64) -> String {
    format!("q{}", level)
}

/// Which rows of a model output frame to extract
#[derive(Debug, Clone)]
pub struct ForecastQuery<'a> {
    pub target_column: &'a str,
    pub target_id: &'a str,
    /// Dimension columns, positionally aligned with `dimension_values`
    pub dimension_columns: &'a [String],
    pub dimension_values: &'a [String],
    pub date_column: &'a str,
    pub output_type_column: &'a str,
    pub output_type_id_column: &'a str,
    pub value_column: &'a str,
}

impl<'a> ForecastQuery<'a> {
    /// A query over standard hubverse columns
    pub fn new(
        model_task: &'a ModelTask,
        date_column: &'a str,
        dimension_values: &'a [String],
    ) -> Self {
        Self {
            target_column: &model_task.target_column,
            target_id: &model_task.target_id,
            dimension_columns: &model_task.viz_dimensions,
            dimension_values,
            date_column,
            output_type_column: OUTPUT_TYPE_COLUMN,
            output_type_id_column: OUTPUT_TYPE_ID_COLUMN,
            value_column: VALUE_COLUMN,
        }
    }

    /// Columns a model output file must provide for this query
    pub fn columns(&self) -> Vec<&'a str> {
        let mut columns = vec![self.target_column];
        columns.extend(self.dimension_columns.iter().map(String::as_str));
        columns.extend([
            self.date_column,
            self.output_type_column,
            self.output_type_id_column,
            self.value_column,
        ]);
        columns
    }
}

/// Extract `query`'s quantile forecasts from `data`.
///
/// Dates appear in the order they are first met in the filtered rows; they
/// are not re-sorted. No surviving rows gives an empty fragment.
pub fn extract_forecast(data: &TabularData, query: &ForecastQuery) -> Result<ForecastFragment> {
    let mut rows = data.filter_eq(query.target_column, query.target_id)?;
    for (column, value) in query.dimension_columns.iter().zip(query.dimension_values) {
        rows = rows.filter_eq(column, value)?;
    }
    rows = rows.filter_eq(query.output_type_column, QUANTILE)?;
    if rows.is_empty() {
        return Ok(ForecastFragment::default());
    }

    let dates = rows.column_as_strings(query.date_column)?;
    let levels = rows.column_as_strings(query.output_type_id_column)?;
    let values = rows.column_as_f64(query.value_column)?;

    let mut groups: Vec<(String, [Option<f64>; LEVEL_COUNT])> = Vec::new();
    for ((date, level), value) in dates.into_iter().zip(levels).zip(values) {
        let (Some(date), Some(slot)) = (date, level.as_deref().and_then(level_slot)) else {
            continue;
        };
        let position = match groups.iter().position(|(seen, _)| *seen == date) {
            Some(position) => position,
            None => {
                groups.push((date, [None; LEVEL_COUNT]));
                groups.len() - 1
            }
        };
        let cell = &mut groups[position].1[slot];
        if cell.is_none() {
            *cell = value;
        }
    }

    let mut fragment = ForecastFragment::default();
    if groups.is_empty() {
        return Ok(fragment);
    }
    for (slot, level) in QUANTILE_LEVELS.iter().enumerate() {
        let column = groups.iter().map(|(_, cells)| cells[slot]).collect();
        fragment.quantiles.insert(level_key(*level), column);
    }
    fragment.target_end_date = groups.into_iter().map(|(date, _)| date).collect();

    Ok(fragment)
}

/// Position of a quantile level in `QUANTILE_LEVELS`. Accepts any text that
/// parses to one of the levels, e.g. "0.5" or "0.50".
fn level_slot(text: &str) -> Option<usize> {
    let level: f64 = text.trim().parse().ok()?;
    QUANTILE_LEVELS
        .iter()
        .position(|required| (required - level).abs() < LEVEL_TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataLoader;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn query<'a>(
        dimension_columns: &'a [String],
        dimension_values: &'a [String],
    ) -> ForecastQuery<'a> {
        ForecastQuery {
            target_column: "target",
            target_id: "wk inc flu hosp",
            dimension_columns,
            dimension_values,
            date_column: "target_end_date",
            output_type_column: OUTPUT_TYPE_COLUMN,
            output_type_id_column: OUTPUT_TYPE_ID_COLUMN,
            value_column: VALUE_COLUMN,
        }
    }

    /// Two target dates, five levels each, for US, plus rows that must be
    /// filtered out
    fn model_output() -> TabularData {
        let mut target = Vec::new();
        let mut location = Vec::new();
        let mut date = Vec::new();
        let mut output_type = Vec::new();
        let mut output_type_id = Vec::new();
        let mut value = Vec::new();

        for (day, base) in [("2022-10-22", 1000.0), ("2022-10-29", 2000.0)] {
            // levels deliberately out of order
            let levels = [("0.975", 5.0), ("0.025", 1.0), ("0.5", 3.0), ("0.25", 2.0), ("0.75", 4.0)];
            for (level, offset) in levels {
                target.push("wk inc flu hosp");
                location.push("US");
                date.push(day);
                output_type.push("quantile");
                output_type_id.push(level);
                value.push(base + offset);
            }
        }
        let extra = [
            ("wk inc flu hosp", "US", "2022-10-22", "quantile", "0.05", 1.0),
            ("wk inc flu hosp", "US", "2022-10-22", "pmf", "large", 0.3),
            ("wk inc flu hosp", "01", "2022-10-22", "quantile", "0.5", 7.0),
            ("wk flu hosp rate", "US", "2022-10-22", "quantile", "0.5", 9.0),
        ];
        for (t, l, d, o, i, v) in extra {
            target.push(t);
            location.push(l);
            date.push(d);
            output_type.push(o);
            output_type_id.push(i);
            value.push(v);
        }

        DataLoader::from_dataframe(
            df!(
                "target" => target,
                "location" => location,
                "target_end_date" => date,
                "output_type" => output_type,
                "output_type_id" => output_type_id,
                "value" => value
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_two_dates_five_levels() {
        let dims = vec!["location".to_string()];
        let values = vec!["US".to_string()];
        let fragment = extract_forecast(&model_output(), &query(&dims, &values)).unwrap();

        assert_eq!(fragment.target_end_date, vec!["2022-10-22", "2022-10-29"]);
        assert_eq!(
            fragment.quantiles.keys().collect::<Vec<_>>(),
            vec!["q0.025", "q0.25", "q0.5", "q0.75", "q0.975"]
        );
        for values in fragment.quantiles.values() {
            assert_eq!(values.len(), 2);
        }
        assert_eq!(fragment.level(0.025).unwrap(), &[Some(1001.0), Some(2001.0)]);
        assert_eq!(fragment.level(0.975).unwrap(), &[Some(1005.0), Some(2005.0)]);

        let per_date: Vec<f64> = QUANTILE_LEVELS
            .iter()
            .map(|level| fragment.level(*level).unwrap()[0].unwrap())
            .collect();
        assert!(per_date.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_dates_keep_row_order() {
        let df = df!(
            "target" => &["t", "t"],
            "target_end_date" => &["2022-11-05", "2022-10-29"],
            "output_type" => &["quantile", "quantile"],
            "output_type_id" => &[0.5f64, 0.5],
            "value" => &[2.0f64, 1.0]
        )
        .unwrap();
        let data = DataLoader::from_dataframe(df);
        let mut q = query(&[], &[]);
        q.target_id = "t";

        let fragment = extract_forecast(&data, &q).unwrap();
        assert_eq!(fragment.target_end_date, vec!["2022-11-05", "2022-10-29"]);
        assert_eq!(fragment.level(0.5).unwrap(), &[Some(2.0), Some(1.0)]);
        assert_eq!(fragment.level(0.25).unwrap(), &[None, None]);
    }

    #[test]
    fn test_no_match_gives_empty_fragment() {
        let dims = vec!["location".to_string()];
        for values in [vec!["02".to_string()], vec!["US".to_string()]] {
            let mut q = query(&dims, &values);
            if values[0] == "US" {
                q.target_id = "wk inc covid hosp";
            }
            let fragment = extract_forecast(&model_output(), &q).unwrap();
            assert!(fragment.is_empty());
            assert!(fragment.quantiles.is_empty());
        }
    }

    #[test]
    fn test_fragment_wire_format() {
        let dims = vec!["location".to_string()];
        let values = vec!["01".to_string()];
        let fragment = extract_forecast(&model_output(), &query(&dims, &values)).unwrap();
        let json = serde_json::to_value(&fragment).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "target_end_date": ["2022-10-22"],
                "q0.025": [null],
                "q0.25": [null],
                "q0.5": [7.0],
                "q0.75": [null],
                "q0.975": [null]
            })
        );
    }

    #[test]
    fn test_level_slot_accepts_text_forms() {
        assert_eq!(level_slot("0.5"), Some(2));
        assert_eq!(level_slot("0.50"), Some(2));
        assert_eq!(level_slot(" 0.975"), Some(4));
        assert_eq!(level_slot("0.05"), None);
        assert_eq!(level_slot("large"), None);
    }
}
