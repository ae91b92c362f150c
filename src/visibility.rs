//! Column visibility state machine driven by legend clicks.
//!
//! The controller owns, per data series, a [`Visibility`] flag and a
//! [`SeriesStyle`], plus the aggregate `all_hidden` flag and the label shown on
//! the aggregate ("Hide all" / "Show all") legend entry. Every transition ends
//! with the same reconciliation step, so these hold after any call:
//!
//! - hidden series carry [`MUTED_COLOR`], visible ones their default color;
//! - `all_hidden` is true iff no data series is visible;
//! - the aggregate label reads "Show all" iff `all_hidden`.
//!
//! Transitions for a legend click, in priority order:
//!
//! | clicked column    | state              | effect                        |
//! |-------------------|--------------------|-------------------------------|
//! | aggregate         | `all_hidden=false` | hide every series             |
//! | aggregate         | `all_hidden=true`  | show every series             |
//! | visible series    | -                  | hide that series              |
//! | hidden series     | -                  | show that series              |
//! | anything else     | -                  | ignored                       |

use crate::dataset::{AGGREGATE_INDEX, CATEGORY_INDEX, Dataset, HIDE_ALL_LABEL, SHOW_ALL_LABEL};
use crate::models::{Column, ColumnType, Rgb};
use crate::options::MUTED_COLOR;
use crate::session::Selection;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Per-series display override handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeriesStyle {
    /// `None` means the renderer's default palette color.
    pub color: Option<Rgb>,
    /// Explicit color saved while the series is muted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_color: Option<Rgb>,
}

impl SeriesStyle {
    pub fn with_color(color: Rgb) -> Self {
        Self {
            color: Some(color),
            backup_color: Some(color),
        }
    }

    pub fn mute(&mut self) {
        if let Some(c) = self.color
            && c != MUTED_COLOR
        {
            self.backup_color = Some(c);
        }
        self.color = Some(MUTED_COLOR);
    }

    pub fn unmute(&mut self) {
        self.color = self.backup_color;
    }

    pub fn is_muted(&self) -> bool {
        self.color == Some(MUTED_COLOR)
    }
}

/// One entry of a [`ColumnProjection`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProjectedColumn {
    /// Draw column `index` unmodified.
    PassThrough { index: usize },
    /// Replace column `index` with all-null values, keeping its legend entry.
    Placeholder {
        index: usize,
        label: String,
        kind: ColumnType,
    },
}

impl ProjectedColumn {
    pub fn index(&self) -> usize {
        match self {
            ProjectedColumn::PassThrough { index } | ProjectedColumn::Placeholder { index, .. } => {
                *index
            }
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, ProjectedColumn::PassThrough { .. })
    }
}

/// Ordered per-column draw decision for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnProjection(Vec<ProjectedColumn>);

impl ColumnProjection {
    pub fn iter(&self) -> std::slice::Iter<'_, ProjectedColumn> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, column: usize) -> Option<&ProjectedColumn> {
        self.0.get(column)
    }

    pub fn is_visible(&self, column: usize) -> bool {
        self.get(column).is_some_and(ProjectedColumn::is_visible)
    }

    /// Visible columns excluding the category axis.
    pub fn visible_series(&self) -> Vec<usize> {
        self.iter()
            .filter(|c| c.is_visible() && c.index() != CATEGORY_INDEX)
            .map(ProjectedColumn::index)
            .collect()
    }
}

/// Which row of the transition table a click fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transition", content = "column", rename_all = "snake_case")]
pub enum Transition {
    HideAll,
    ShowAll,
    HideSeries(usize),
    ShowSeries(usize),
    Ignored,
}

impl Transition {
    pub fn changed(self) -> bool {
        self != Transition::Ignored
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::HideAll => write!(f, "hide all"),
            Transition::ShowAll => write!(f, "show all"),
            Transition::HideSeries(c) => write!(f, "hide column {c}"),
            Transition::ShowSeries(c) => write!(f, "show column {c}"),
            Transition::Ignored => write!(f, "ignored"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SeriesState {
    visibility: Visibility,
    style: SeriesStyle,
}

/// Serializable view of the controller, one entry per data series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilitySnapshot {
    pub all_hidden: bool,
    pub aggregate_label: String,
    pub series: Vec<SeriesSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSnapshot {
    pub column: usize,
    pub label: String,
    pub visibility: Visibility,
    pub color: Option<Rgb>,
}

/// Owns the visibility state for one chart for the life of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityController {
    columns: Vec<Column>,
    /// Indexed by `column - 2`.
    series: Vec<SeriesState>,
    aggregate_style: SeriesStyle,
    aggregate_label: String,
    all_hidden: bool,
}

impl VisibilityController {
    /// Every series starts visible; call [`initialize`](Self::initialize) to apply defaults.
    pub fn new(dataset: &Dataset) -> Self {
        let series = dataset
            .data_series_indices()
            .map(|_| SeriesState {
                visibility: Visibility::Visible,
                style: SeriesStyle::default(),
            })
            .collect();
        let mut controller = Self {
            columns: dataset.columns().to_vec(),
            series,
            aggregate_style: SeriesStyle::default(),
            aggregate_label: HIDE_ALL_LABEL.to_string(),
            all_hidden: false,
        };
        controller.reconcile();
        controller
    }

    /// Seed explicit default colors keyed by series index (`column - 1`).
    pub fn with_series_colors(mut self, colors: &BTreeMap<usize, Rgb>) -> Self {
        for (&series_index, &color) in colors {
            let Some(column) = series_index.checked_add(1) else {
                warn!("ignoring color for series {series_index}: not a data series");
                continue;
            };
            match self.state_mut(column) {
                Some(state) => state.style = SeriesStyle::with_color(color),
                None => warn!("ignoring color for series {series_index}: not a data series"),
            }
        }
        self.reconcile();
        self
    }

    /// Mark each data series visible iff its column index is in `default_visible`.
    pub fn initialize(&mut self, default_visible: &[usize]) {
        for &c in default_visible {
            if c == AGGREGATE_INDEX {
                debug!("default-visible column {c} is the aggregate column; skipped");
            } else if self.slot(c).is_none() {
                warn!("default-visible column {c} is not a data series; skipped");
            }
        }
        let first = AGGREGATE_INDEX + 1;
        for (i, state) in self.series.iter_mut().enumerate() {
            state.visibility = if default_visible.contains(&(first + i)) {
                Visibility::Visible
            } else {
                Visibility::Hidden
            };
        }
        self.reconcile();
        debug!(
            "initialized: visible={:?} all_hidden={}",
            self.visible_series(),
            self.all_hidden
        );
    }

    /// Apply the transition table for a click on the legend entry of `column`.
    pub fn handle_legend_click(&mut self, column: usize) -> Transition {
        let transition = if column == AGGREGATE_INDEX {
            let target = if self.all_hidden {
                Visibility::Visible
            } else {
                Visibility::Hidden
            };
            for state in &mut self.series {
                state.visibility = target;
            }
            if self.all_hidden {
                Transition::ShowAll
            } else {
                Transition::HideAll
            }
        } else if let Some(state) = self.state_mut(column) {
            match state.visibility {
                Visibility::Visible => {
                    state.visibility = Visibility::Hidden;
                    Transition::HideSeries(column)
                }
                Visibility::Hidden => {
                    state.visibility = Visibility::Visible;
                    Transition::ShowSeries(column)
                }
            }
        } else {
            Transition::Ignored
        };

        if transition.changed() {
            self.reconcile();
        }
        debug!(
            "legend click on column {column}: {transition} (all_hidden={})",
            self.all_hidden
        );
        transition
    }

    /// Route a renderer selection. Only a column-only (legend) selection acts;
    /// empty and row-targeted selections are ignored.
    pub fn handle_selection(&mut self, selection: &[Selection]) -> Transition {
        match selection.first() {
            Some(Selection {
                row: None,
                column: Some(column),
            }) => self.handle_legend_click(*column),
            _ => Transition::Ignored,
        }
    }

    fn slot(&self, column: usize) -> Option<usize> {
        let first = AGGREGATE_INDEX + 1;
        (column >= first && column - first < self.series.len()).then(|| column - first)
    }

    fn state_mut(&mut self, column: usize) -> Option<&mut SeriesState> {
        let slot = self.slot(column)?;
        self.series.get_mut(slot)
    }

    /// Bring colors, `all_hidden` and the aggregate label in line with the visible set.
    fn reconcile(&mut self) {
        for state in &mut self.series {
            match state.visibility {
                Visibility::Visible => state.style.unmute(),
                Visibility::Hidden => state.style.mute(),
            }
        }
        self.all_hidden = self
            .series
            .iter()
            .all(|s| s.visibility == Visibility::Hidden);
        if self.all_hidden {
            self.aggregate_style.mute();
            self.aggregate_label = SHOW_ALL_LABEL.to_string();
        } else {
            self.aggregate_style.unmute();
            self.aggregate_label = HIDE_ALL_LABEL.to_string();
        }
    }

    pub fn all_hidden(&self) -> bool {
        self.all_hidden
    }

    pub fn aggregate_label(&self) -> &str {
        &self.aggregate_label
    }

    /// Visibility of a data series column; `None` for the axis, aggregate or out-of-range columns.
    pub fn visibility(&self, column: usize) -> Option<Visibility> {
        self.slot(column).map(|s| self.series[s].visibility)
    }

    pub fn is_visible(&self, column: usize) -> bool {
        self.visibility(column) == Some(Visibility::Visible)
    }

    /// Style of a data series or the aggregate entry.
    pub fn style(&self, column: usize) -> Option<&SeriesStyle> {
        if column == AGGREGATE_INDEX {
            return Some(&self.aggregate_style);
        }
        self.slot(column).map(|s| &self.series[s].style)
    }

    /// Column indices of the visible data series.
    pub fn visible_series(&self) -> Vec<usize> {
        let first = AGGREGATE_INDEX + 1;
        self.series
            .iter()
            .enumerate()
            .filter(|(_, s)| s.visibility == Visibility::Visible)
            .map(|(i, _)| first + i)
            .collect()
    }

    /// Current label of a column as it should appear in the legend.
    pub fn label(&self, column: usize) -> Option<&str> {
        if column == AGGREGATE_INDEX {
            return Some(&self.aggregate_label);
        }
        self.columns.get(column).map(|c| c.label.as_str())
    }

    /// Per-column draw decision. The category axis always passes through and
    /// the aggregate column is always a placeholder.
    pub fn projection(&self) -> ColumnProjection {
        let entries = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, col)| {
                if index == CATEGORY_INDEX || self.is_visible(index) {
                    ProjectedColumn::PassThrough { index }
                } else {
                    ProjectedColumn::Placeholder {
                        index,
                        label: self.label(index).unwrap_or(&col.label).to_string(),
                        kind: col.kind,
                    }
                }
            })
            .collect();
        ColumnProjection(entries)
    }

    /// Styles keyed by series index (`column - 1`); entry 0 is the aggregate entry.
    pub fn style_map(&self) -> BTreeMap<usize, SeriesStyle> {
        (AGGREGATE_INDEX..self.columns.len())
            .filter_map(|c| self.style(c).map(|s| (c - 1, *s)))
            .collect()
    }

    pub fn snapshot(&self) -> VisibilitySnapshot {
        let first = AGGREGATE_INDEX + 1;
        VisibilitySnapshot {
            all_hidden: self.all_hidden,
            aggregate_label: self.aggregate_label.clone(),
            series: self
                .series
                .iter()
                .enumerate()
                .map(|(i, s)| SeriesSnapshot {
                    column: first + i,
                    label: self.columns[first + i].label.clone(),
                    visibility: s.visibility,
                    color: s.style.color,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(defaults: &[usize]) -> VisibilityController {
        let mut c = VisibilityController::new(&Dataset::demo());
        c.initialize(defaults);
        c
    }

    #[test]
    fn mute_keeps_explicit_color_for_unmute() {
        let red = Rgb::new(255, 0, 0);
        let mut s = SeriesStyle::with_color(red);
        s.mute();
        assert!(s.is_muted());
        s.mute();
        assert_eq!(s.backup_color, Some(red));
        s.unmute();
        assert_eq!(s.color, Some(red));
    }

    #[test]
    fn default_style_unmutes_to_library_default() {
        let mut s = SeriesStyle::default();
        s.mute();
        s.unmute();
        assert_eq!(s.color, None);
    }

    #[test]
    fn axis_and_out_of_range_clicks_are_ignored() {
        let mut c = controller(&[2, 3]);
        let before = c.clone();
        assert_eq!(c.handle_legend_click(0), Transition::Ignored);
        assert_eq!(c.handle_legend_click(6), Transition::Ignored);
        assert_eq!(c.handle_legend_click(usize::MAX), Transition::Ignored);
        assert_eq!(c, before);
    }

    #[test]
    fn projection_keeps_axis_and_hides_aggregate() {
        let c = controller(&[2]);
        let p = c.projection();
        assert_eq!(p.len(), 6);
        assert_eq!(p.get(0), Some(&ProjectedColumn::PassThrough { index: 0 }));
        assert_eq!(
            p.get(1),
            Some(&ProjectedColumn::Placeholder {
                index: 1,
                label: HIDE_ALL_LABEL.into(),
                kind: ColumnType::Number,
            })
        );
        assert!(p.is_visible(2));
        assert!(!p.is_visible(3));
        assert_eq!(p.visible_series(), vec![2]);
    }

    #[test]
    fn style_map_is_keyed_by_series_index() {
        let c = controller(&[2, 4]);
        let m = c.style_map();
        assert_eq!(m.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert_eq!(m[&0].color, None);
        assert_eq!(m[&1].color, None);
        assert_eq!(m[&2].color, Some(MUTED_COLOR));
    }

    #[test]
    fn seeded_colors_survive_a_hide_show_cycle() {
        let blue = Rgb::new(0, 0, 255);
        let colors = BTreeMap::from([(1, blue)]);
        let mut c = VisibilityController::new(&Dataset::demo()).with_series_colors(&colors);
        c.initialize(&[2, 3]);
        assert_eq!(c.style(2).unwrap().color, Some(blue));
        c.handle_legend_click(2);
        assert_eq!(c.style(2).unwrap().color, Some(MUTED_COLOR));
        c.handle_legend_click(2);
        assert_eq!(c.style(2).unwrap().color, Some(blue));
    }

    #[test]
    fn snapshot_lists_every_data_series() {
        let c = controller(&[3]);
        let snap = c.snapshot();
        assert_eq!(snap.series.len(), 4);
        assert_eq!(snap.series[0].column, 2);
        assert_eq!(snap.series[0].label, "Group1");
        assert_eq!(snap.series[0].visibility, Visibility::Hidden);
        assert_eq!(snap.series[1].visibility, Visibility::Visible);
        assert_eq!(snap.aggregate_label, HIDE_ALL_LABEL);
    }
}
