//! The chart's data table.
//!
//! Column 0 is the category axis, column 1 the synthetic "Hide all / Show all"
//! aggregate column (constant 0, never plotted) and columns `2..` the data series.
//! A [`Dataset`] is immutable once built.

use crate::models::{Cell, Column, NamedSeries};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Index of the category (domain) column.
pub const CATEGORY_INDEX: usize = 0;
/// Index of the aggregate toggle column.
pub const AGGREGATE_INDEX: usize = 1;
/// Aggregate legend label while at least one series is visible.
pub const HIDE_ALL_LABEL: &str = "Hide all";
/// Aggregate legend label while every series is hidden.
pub const SHOW_ALL_LABEL: &str = "Show all";

/// Where the aggregate toggle column comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateColumn {
    /// Insert the aggregate column at index 1 (skipped if it is already there).
    #[default]
    Synthesize,
    /// The caller's table already carries the aggregate column at index 1.
    Supplied,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset has no categories")]
    EmptyCategories,
    #[error("dataset has no data series")]
    NoSeries,
    #[error("series {name:?} has {found} values, expected {expected}")]
    SeriesLength {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row}, column {column}: expected a number or null")]
    NonNumeric { row: usize, column: usize },
}

/// Immutable ordered table of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// Build from a row-major table whose first row holds the column labels,
    /// e.g. `["Year", "Group1", ...]` followed by `["2008", 300, ...]`.
    pub fn from_rows(
        header: &[&str],
        rows: Vec<Vec<Cell>>,
        aggregate: AggregateColumn,
    ) -> Result<Self, DatasetError> {
        let width = header.len();
        let min_width = match aggregate {
            AggregateColumn::Synthesize => 2,
            AggregateColumn::Supplied => 3,
        };
        if width < min_width {
            return Err(DatasetError::NoSeries);
        }
        if rows.is_empty() {
            return Err(DatasetError::EmptyCategories);
        }

        let mut columns = Vec::with_capacity(width + 1);
        columns.push(Column::category(header[0]));
        columns.extend(header[1..].iter().map(|l| Column::number(*l)));

        let mut table = Vec::with_capacity(rows.len());
        for (ri, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(DatasetError::RaggedRow {
                    row: ri,
                    expected: width,
                    found: row.len(),
                });
            }
            let mut cells = row.into_iter();
            let category = match cells.next() {
                Some(Cell::Number(v)) => Cell::Text(v.to_string()),
                Some(other) => other,
                None => Cell::Null,
            };
            let mut out = Vec::with_capacity(width + 1);
            out.push(category);
            for (ci, cell) in cells.enumerate() {
                if matches!(cell, Cell::Text(_)) {
                    return Err(DatasetError::NonNumeric {
                        row: ri,
                        column: ci + 1,
                    });
                }
                out.push(cell);
            }
            table.push(out);
        }

        let mut dataset = Self {
            columns,
            rows: table,
        };
        match aggregate {
            AggregateColumn::Synthesize => dataset = dataset.with_aggregate(),
            AggregateColumn::Supplied => dataset.zero_aggregate(),
        }
        Ok(dataset)
    }

    /// Ensure column 1 is the aggregate toggle column. Idempotent: a table that
    /// already carries the aggregate column keeps it, with any nulls set to 0.
    pub fn with_aggregate(mut self) -> Self {
        if self.has_aggregate() {
            self.zero_aggregate();
            return self;
        }
        self.columns
            .insert(AGGREGATE_INDEX, Column::number(HIDE_ALL_LABEL));
        for row in &mut self.rows {
            if row.is_empty() {
                row.push(Cell::Null);
            }
            row.insert(AGGREGATE_INDEX, Cell::Number(0.0));
        }
        self
    }

    /// Whether column 1 looks like the aggregate column (toggle label, zeros or nulls).
    pub fn has_aggregate(&self) -> bool {
        let Some(col) = self.columns.get(AGGREGATE_INDEX) else {
            return false;
        };
        (col.label == HIDE_ALL_LABEL || col.label == SHOW_ALL_LABEL)
            && self
                .rows
                .iter()
                .all(|r| match r.get(AGGREGATE_INDEX) {
                    Some(Cell::Number(v)) => *v == 0.0,
                    Some(Cell::Null) => true,
                    _ => false,
                })
    }

    fn zero_aggregate(&mut self) {
        for row in &mut self.rows {
            row[AGGREGATE_INDEX] = Cell::Number(0.0);
        }
    }

    /// Sample table: six years, four groups.
    pub fn demo() -> Self {
        let years = ["2008", "2009", "2010", "2011", "2012", "2013"];
        DatasetBuilder::new("Year")
            .categories(years)
            .series(NamedSeries::new(
                "Group1",
                [300.0, 900.0, 1670.0, 1350.0, 1280.0, 1030.0],
            ))
            .series(NamedSeries::new(
                "Group2",
                [1600.0, 1200.0, 1060.0, 820.0, 600.0, 540.0],
            ))
            .series(NamedSeries::new(
                "Group3",
                [0.0, 0.0, 250.0, 800.0, 1200.0, 1950.0],
            ))
            .series(NamedSeries::new(
                "Group4",
                [1200.0, 1600.0, 1350.0, 1000.0, 800.0, 350.0],
            ))
            .build()
            .unwrap_or_else(|e| unreachable!("demo table is well-formed: {e}"))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Category labels in row order.
    pub fn categories(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| {
                r.get(CATEGORY_INDEX)
                    .and_then(Cell::as_text)
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }

    /// Values of one column in row order (`None` for nulls).
    pub fn series_values(&self, column: usize) -> Vec<Option<f64>> {
        self.rows
            .iter()
            .map(|r| r.get(column).and_then(Cell::as_f64))
            .collect()
    }

    /// Column indices of the data series (everything after the aggregate column).
    pub fn data_series_indices(&self) -> Range<usize> {
        (AGGREGATE_INDEX + 1)..self.columns.len()
    }

    pub fn is_data_series(&self, column: usize) -> bool {
        self.data_series_indices().contains(&column)
    }

    /// Min/max over the numeric values of the given columns.
    pub fn value_range(&self, columns: impl IntoIterator<Item = usize>) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for c in columns {
            for v in self.series_values(c).into_iter().flatten() {
                range = Some(match range {
                    Some((lo, hi)) => (lo.min(v), hi.max(v)),
                    None => (v, v),
                });
            }
        }
        range
    }
}

/// Builds a [`Dataset`] from named series.
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    category_label: String,
    categories: Vec<String>,
    series: Vec<NamedSeries>,
    aggregate: AggregateColumn,
}

impl DatasetBuilder {
    pub fn new(category_label: impl Into<String>) -> Self {
        Self {
            category_label: category_label.into(),
            categories: Vec::new(),
            series: Vec::new(),
            aggregate: AggregateColumn::default(),
        }
    }

    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn series(mut self, series: NamedSeries) -> Self {
        self.series.push(series);
        self
    }

    /// With [`AggregateColumn::Supplied`] the first series is taken as the
    /// aggregate column; its values are forced to 0.
    pub fn aggregate(mut self, aggregate: AggregateColumn) -> Self {
        self.aggregate = aggregate;
        self
    }

    pub fn build(self) -> Result<Dataset, DatasetError> {
        if self.categories.is_empty() {
            return Err(DatasetError::EmptyCategories);
        }
        let needed = match self.aggregate {
            AggregateColumn::Synthesize => 1,
            AggregateColumn::Supplied => 2,
        };
        if self.series.len() < needed {
            return Err(DatasetError::NoSeries);
        }
        for s in &self.series {
            if s.values.len() != self.categories.len() {
                return Err(DatasetError::SeriesLength {
                    name: s.name.clone(),
                    expected: self.categories.len(),
                    found: s.values.len(),
                });
            }
        }

        let header: Vec<&str> = std::iter::once(self.category_label.as_str())
            .chain(self.series.iter().map(|s| s.name.as_str()))
            .collect();
        let rows = self
            .categories
            .iter()
            .enumerate()
            .map(|(ri, cat)| {
                std::iter::once(Cell::Text(cat.clone()))
                    .chain(self.series.iter().map(|s| Cell::from(s.values[ri])))
                    .collect()
            })
            .collect();
        Dataset::from_rows(&header, rows, self.aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnType;

    #[test]
    fn demo_has_axis_aggregate_and_four_series() {
        let ds = Dataset::demo();
        assert_eq!(ds.column_count(), 6);
        assert_eq!(ds.row_count(), 6);
        assert_eq!(ds.column(0).unwrap().kind, ColumnType::String);
        assert_eq!(ds.column(1).unwrap().label, HIDE_ALL_LABEL);
        assert_eq!(ds.data_series_indices(), 2..6);
        assert!(ds.series_values(1).iter().all(|v| *v == Some(0.0)));
    }

    #[test]
    fn with_aggregate_is_idempotent() {
        let ds = Dataset::demo();
        let again = ds.clone().with_aggregate().with_aggregate();
        assert_eq!(ds, again);
    }

    #[test]
    fn supplied_aggregate_is_not_duplicated() {
        let ds = Dataset::from_rows(
            &["Year", "Hide all", "A", "B"],
            vec![
                vec!["2008".into(), 0.0.into(), 1.0.into(), 2.0.into()],
                vec!["2009".into(), 5.0.into(), 3.0.into(), 4.0.into()],
            ],
            AggregateColumn::Supplied,
        )
        .unwrap();
        assert_eq!(ds.column_count(), 4);
        assert_eq!(ds.series_values(1), vec![Some(0.0), Some(0.0)]);
        assert!(ds.has_aggregate());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Dataset::from_rows(
            &["Year", "A"],
            vec![vec!["2008".into(), 1.0.into()], vec!["2009".into()]],
            AggregateColumn::Synthesize,
        )
        .unwrap_err();
        assert_eq!(
            err,
            DatasetError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn numeric_categories_become_text() {
        let ds = Dataset::from_rows(
            &["Year", "A"],
            vec![vec![2008.0.into(), 1.0.into()]],
            AggregateColumn::Synthesize,
        )
        .unwrap();
        assert_eq!(ds.categories(), vec!["2008".to_string()]);
    }

    #[test]
    fn value_range_spans_requested_columns() {
        let ds = Dataset::demo();
        assert_eq!(ds.value_range([2]), Some((300.0, 1670.0)));
        assert_eq!(ds.value_range(ds.data_series_indices()), Some((0.0, 1950.0)));
        assert_eq!(ds.value_range(std::iter::empty()), None);
    }
}
