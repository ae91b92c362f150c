//! Static chart configuration handed to the renderer with every draw.

use crate::models::Rgb;
use crate::viz::LegendMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Color that marks a series as hidden in the legend.
pub const MUTED_COLOR: Rgb = Rgb::new(0xCC, 0xCC, 0xCC);

/// Axis title and optional fixed bounds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Axis {
    pub title: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub title: String,
    pub background_color: Rgb,
    pub v_axis: Axis,
    /// Horizontal axis; a missing title falls back to the category column label.
    pub h_axis: Axis,
    /// Explicit colors keyed by series index (`column - 1`).
    pub series_colors: BTreeMap<usize, Rgb>,
    /// Locale tag for tick labels, e.g. `"en"` or `"de"`.
    pub locale: String,
    pub legend: LegendMode,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "Title goes here".to_string(),
            background_color: Rgb::new(0xF4, 0xF4, 0xF6),
            v_axis: Axis {
                title: Some("Label your axes!".to_string()),
                min_value: Some(0.0),
                max_value: Some(2000.0),
            },
            h_axis: Axis::default(),
            series_colors: BTreeMap::new(),
            locale: "en".to_string(),
            legend: LegendMode::default(),
        }
    }
}

impl ChartOptions {
    /// Vertical range to plot: the configured bounds where present, the data range otherwise.
    pub fn y_range(&self, data: Option<(f64, f64)>) -> (f64, f64) {
        let (data_lo, data_hi) = data.unwrap_or((0.0, 1.0));
        let lo = self.v_axis.min_value.unwrap_or(data_lo).min(data_lo);
        let hi = self.v_axis.max_value.unwrap_or(data_hi).max(data_hi);
        if (hi - lo).abs() < f64::EPSILON {
            (lo - 1.0, hi + 1.0)
        } else {
            (lo, hi)
        }
    }
}
