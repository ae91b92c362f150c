//! Public types and constants for the visualization module.

use serde::{Deserialize, Serialize};

/// Legend placement options. The legend is always a separate panel so every
/// entry has a fixed, clickable rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendMode {
    /// Single-column panel on the right side.
    #[default]
    Right,
    /// Multi-row band at the top.
    Top,
    /// Multi-row band at the bottom.
    Bottom,
}

/// Number of Y tick labels requested from the mesh.
pub const Y_LABEL_COUNT: usize = 10;

/// Fraction of the canvas width given to the plot when the legend sits on the right.
pub const RIGHT_LEGEND_PLOT_PERCENT: i32 = 80;
