//! JSON configuration file: chart options, the initial visibility set and an
//! optional inline table (the demo table is used when absent).
//!
//! ```json
//! {
//!   "default_visible": [2, 4, 5],
//!   "aggregate": "synthesize",
//!   "options": { "title": "Sales", "v_axis": { "max_value": 2500 } },
//!   "table": {
//!     "header": ["Year", "North", "South"],
//!     "rows": [["2012", 10, 12], ["2013", 14, null]]
//!   }
//! }
//! ```
//! Every field is optional.

use crate::dataset::{AggregateColumn, Dataset, DatasetError};
use crate::models::Cell;
use crate::options::ChartOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Row-major table literal; `header` holds the column labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub options: ChartOptions,
    /// Column indices of the series shown when the chart opens.
    pub default_visible: Vec<usize>,
    /// Whether `table` already carries the aggregate column.
    pub aggregate: AggregateColumn,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableSpec>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            options: ChartOptions::default(),
            default_visible: vec![1, 2, 3],
            aggregate: AggregateColumn::default(),
            table: None,
        }
    }
}

impl ChartConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The configured table, or [`Dataset::demo`] when none is given.
    pub fn dataset(&self) -> Result<Dataset, DatasetError> {
        match &self.table {
            Some(t) => {
                let header: Vec<&str> = t.header.iter().map(String::as_str).collect();
                Dataset::from_rows(&header, t.rows.clone(), self.aggregate)
            }
            None => Ok(Dataset::demo()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let c = ChartConfig::from_json("{}").unwrap();
        assert_eq!(c, ChartConfig::default());
        assert_eq!(c.default_visible, vec![1, 2, 3]);
    }

    #[test]
    fn fields_override_defaults() {
        let c = ChartConfig::from_json(
            r#"{"default_visible": [2, 4, 5], "aggregate": "supplied", "options": {"title": "T"}}"#,
        )
        .unwrap();
        assert_eq!(c.default_visible, vec![2, 4, 5]);
        assert_eq!(c.aggregate, AggregateColumn::Supplied);
        assert_eq!(c.options.title, "T");
    }

    #[test]
    fn inline_table_builds_dataset() {
        let c = ChartConfig::from_json(
            r#"{"table": {"header": ["Year", "A", "B"], "rows": [["2012", 1, 2], ["2013", 3, null]]}}"#,
        )
        .unwrap();
        let ds = c.dataset().unwrap();
        assert_eq!(ds.column_count(), 4);
        assert_eq!(ds.column(2).unwrap().label, "A");
        assert_eq!(ds.series_values(3), vec![Some(2.0), None]);
    }

    #[test]
    fn no_table_means_demo() {
        let ds = ChartConfig::default().dataset().unwrap();
        assert_eq!(ds, Dataset::demo());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ChartConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
