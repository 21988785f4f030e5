//! Tabular data handling for model output and ground-truth files

use crate::error::{Result, VizError};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Supported tabular file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Parquet,
}

impl FileFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());
        match extension.as_deref() {
            Some("csv") => Ok(FileFormat::Csv),
            Some("parquet") | Some("pqt") => Ok(FileFormat::Parquet),
            _ => Err(VizError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// A loaded table. Comparisons against task id values are done on the text
/// form of a column, so date, integer and string encodings of the same value
/// all match.
#[derive(Debug, Clone)]
pub struct TabularData {
    df: DataFrame,
}

/// Data loader for hub tabular files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV or Parquet file, optionally keeping only `columns`
    pub fn load<P: AsRef<Path>>(path: P, columns: Option<&[&str]>) -> Result<TabularData> {
        let path = path.as_ref();
        match FileFormat::from_path(path)? {
            FileFormat::Csv => Self::from_csv(path, columns),
            FileFormat::Parquet => Self::from_parquet(path, columns),
        }
    }

    /// Load a CSV file. Every cell is read as text and `NA` reads as null, so
    /// codes such as "01" keep their leading zeros.
    pub fn from_csv<P: AsRef<Path>>(path: P, columns: Option<&[&str]>) -> Result<TabularData> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .has_header(true)
            .infer_schema(Some(0))
            .with_null_values(Some(NullValues::AllColumnsSingle("NA".to_string())))
            .with_columns(columns.map(owned_names))
            .finish()?;

        Ok(TabularData { df })
    }

    /// Load a Parquet file
    pub fn from_parquet<P: AsRef<Path>>(path: P, columns: Option<&[&str]>) -> Result<TabularData> {
        let file = File::open(path)?;
        let df = ParquetReader::new(file)
            .with_columns(columns.map(owned_names))
            .finish()?;

        Ok(TabularData { df })
    }

    /// Wrap an existing DataFrame
    #[cfg(test)]
    pub(crate) fn from_dataframe(df: DataFrame) -> TabularData {
        TabularData { df }
    }
}

fn owned_names(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|name| name.to_string()).collect()
}

impl TabularData {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn has_column(&self, column_name: &str) -> bool {
        self.df
            .get_column_names()
            .iter()
            .any(|name| *name == column_name)
    }

    /// Keep the rows whose `column_name` text equals `value`
    pub fn filter_eq(&self, column_name: &str, value: &str) -> Result<Self> {
        self.require_column(column_name)?;
        let df = self
            .df
            .clone()
            .lazy()
            .filter(col(column_name).cast(DataType::Utf8).eq(lit(value)))
            .collect()?;

        Ok(TabularData { df })
    }

    /// Whether any row's `column_name` text equals `value`
    pub fn contains_value(&self, column_name: &str, value: &str) -> Result<bool> {
        Ok(self
            .column_as_strings(column_name)?
            .iter()
            .any(|cell| cell.as_deref() == Some(value)))
    }

    /// A column's cells as text, nulls kept
    pub fn column_as_strings(&self, column_name: &str) -> Result<Vec<Option<String>>> {
        let series = self.require_column(column_name)?.cast(&DataType::Utf8)?;
        let values = series
            .utf8()?
            .into_iter()
            .map(|cell| cell.map(str::to_string))
            .collect();

        Ok(values)
    }

    /// A column's cells as floats. Cells that do not read as numbers become null.
    pub fn column_as_f64(&self, column_name: &str) -> Result<Vec<Option<f64>>> {
        let series = self.require_column(column_name)?.cast(&DataType::Float64)?;
        let values = series.f64()?.into_iter().collect();

        Ok(values)
    }

    fn require_column(&self, column_name: &str) -> Result<&Series> {
        self.df.column(column_name).map_err(|e| {
            VizError::DataError(format!("Column '{}' not found: {}", column_name, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    #[test]
    fn test_format_detection() {
        let format = |name: &str| FileFormat::from_path(Path::new(name)).unwrap();
        assert_eq!(format("a/2022-10-22-m.csv"), FileFormat::Csv);
        assert_eq!(format("a/2022-10-22-m.parquet"), FileFormat::Parquet);
        assert_eq!(format("a/2022-10-22-m.PQT"), FileFormat::Parquet);

        let err = FileFormat::from_path(Path::new("a/2022-10-22-m.arrow")).unwrap_err();
        assert!(matches!(err, VizError::UnsupportedFormat(_)));
        assert!(err.to_string().contains("Only .csv and .parquet are supported"));
    }

    #[test]
    fn test_csv_keeps_codes_as_text() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "truth.csv",
            &["date,location,value", "2022-10-15,01,12", "2022-10-22,US,NA"],
        );

        let data = DataLoader::load(&path, None).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(
            data.column_as_strings("location").unwrap(),
            vec![Some("01".to_string()), Some("US".to_string())]
        );
        assert_eq!(data.column_as_f64("value").unwrap(), vec![Some(12.0), None]);
        assert!(data.contains_value("location", "01").unwrap());
        assert!(!data.contains_value("location", "1").unwrap());
    }

    #[test]
    fn test_column_projection_and_filter() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "output.csv",
            &["target,location,value", "a,US,1", "b,US,2", "a,01,3"],
        );

        let data = DataLoader::load(&path, Some(&["target", "value"])).unwrap();
        assert!(data.has_column("target"));
        assert!(!data.has_column("location"));

        let filtered = data.filter_eq("target", "a").unwrap();
        assert_eq!(filtered.column_as_f64("value").unwrap(), vec![Some(1.0), Some(3.0)]);
        assert!(filtered.filter_eq("target", "c").unwrap().is_empty());
    }

    #[test]
    fn test_missing_column_is_a_data_error() {
        let dir = tempdir().unwrap();
        let path = write_csv(dir.path(), "output.csv", &["target,value", "a,1"]);
        let data = DataLoader::load(&path, None).unwrap();

        let err = data.filter_eq("location", "US").unwrap_err();
        assert!(matches!(err, VizError::DataError(_)));
        assert!(err.to_string().contains("location"));
    }

    #[test]
    fn test_parquet_round_trip_with_numeric_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("2022-10-22-team-model.parquet");
        let mut df = df!(
            "target" => &["wk inc flu hosp", "wk inc flu hosp"],
            "horizon" => &[0i64, 1],
            "output_type_id" => &[0.025f64, 0.5],
            "value" => &[10i64, 20]
        )
        .unwrap();
        ParquetWriter::new(File::create(&path).unwrap())
            .finish(&mut df)
            .unwrap();

        let data = DataLoader::load(&path, Some(&["horizon", "output_type_id", "value"])).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.filter_eq("horizon", "1").unwrap().len(), 1);
        assert_eq!(data.column_as_f64("value").unwrap(), vec![Some(10.0), Some(20.0)]);
        let levels: Vec<f64> = data
            .column_as_strings("output_type_id")
            .unwrap()
            .into_iter()
            .flatten()
            .map(|level| level.parse().unwrap())
            .collect();
        assert_eq!(levels, vec![0.025, 0.5]);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = DataLoader::load("does/not/exist.csv", None).unwrap_err();
        assert!(matches!(err, VizError::IoError(_)));
    }
}
