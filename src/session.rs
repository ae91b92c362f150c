//! Glue between the renderer's selection events and the visibility controller.
//!
//! A [`ChartSession`] owns the dataset, the controller and a [`Renderer`]. Each
//! event runs to completion: the controller transitions, then the session
//! redraws with the new projection. Ignored events cause no redraw.

use crate::dataset::Dataset;
use crate::options::ChartOptions;
use crate::visibility::{
    ColumnProjection, ProjectedColumn, SeriesStyle, Transition, VisibilityController,
};
use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A selection record emitted by the renderer.
///
/// A legend click carries only a column; a data-point click carries a row too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub row: Option<usize>,
    pub column: Option<usize>,
}

impl Selection {
    pub fn legend(column: usize) -> Self {
        Self {
            row: None,
            column: Some(column),
        }
    }

    pub fn point(row: usize, column: usize) -> Self {
        Self {
            row: Some(row),
            column: Some(column),
        }
    }
}

/// Everything the renderer needs for one draw.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub dataset: &'a Dataset,
    pub projection: &'a ColumnProjection,
    pub styles: &'a BTreeMap<usize, SeriesStyle>,
    pub options: &'a ChartOptions,
}

impl Frame<'_> {
    /// Legend label of a column in this frame (placeholders carry the current label).
    pub fn label(&self, column: usize) -> &str {
        match self.projection.get(column) {
            Some(ProjectedColumn::Placeholder { label, .. }) => label.as_str(),
            _ => self
                .dataset
                .column(column)
                .map_or("", |c| c.label.as_str()),
        }
    }

    /// Style of a column, looked up by its series index.
    pub fn style(&self, column: usize) -> Option<&SeriesStyle> {
        column.checked_sub(1).and_then(|s| self.styles.get(&s))
    }
}

/// Draws a frame. Renderers only read the frame; they never touch controller state.
pub trait Renderer {
    fn draw(&mut self, frame: &Frame<'_>) -> Result<()>;
}

pub struct ChartSession<R: Renderer> {
    dataset: Dataset,
    options: ChartOptions,
    controller: VisibilityController,
    renderer: R,
}

impl<R: Renderer> ChartSession<R> {
    /// Build the controller from `options.series_colors` and the default-visible columns.
    pub fn new(
        dataset: Dataset,
        options: ChartOptions,
        default_visible: &[usize],
        renderer: R,
    ) -> Self {
        let mut controller =
            VisibilityController::new(&dataset).with_series_colors(&options.series_colors);
        controller.initialize(default_visible);
        Self {
            dataset,
            options,
            controller,
            renderer,
        }
    }

    /// Initial draw with the default projection.
    pub fn open(&mut self) -> Result<()> {
        self.redraw()
    }

    /// Handle a selection event; redraws only when the state changed.
    pub fn on_select(&mut self, selection: &[Selection]) -> Result<Transition> {
        let transition = self.controller.handle_selection(selection);
        if transition.changed() {
            self.redraw()?;
        } else {
            debug!("selection {selection:?} ignored");
        }
        Ok(transition)
    }

    /// Shorthand for a column-only (legend) selection.
    pub fn click_legend(&mut self, column: usize) -> Result<Transition> {
        self.on_select(&[Selection::legend(column)])
    }

    pub fn redraw(&mut self) -> Result<()> {
        let projection = self.controller.projection();
        let styles = self.controller.style_map();
        let frame = Frame {
            dataset: &self.dataset,
            projection: &projection,
            styles: &styles,
            options: &self.options,
        };
        self.renderer.draw(&frame)
    }

    /// Run `f` on the current frame without going through the renderer (e.g. exports).
    pub fn with_frame<T>(&self, f: impl FnOnce(&Frame<'_>) -> T) -> T {
        let projection = self.controller.projection();
        let styles = self.controller.style_map();
        f(&Frame {
            dataset: &self.dataset,
            projection: &projection,
            styles: &styles,
            options: &self.options,
        })
    }

    pub fn controller(&self) -> &VisibilityController {
        &self.controller
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::HIDE_ALL_LABEL;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<(Vec<usize>, String)>,
    }

    impl Renderer for Recorder {
        fn draw(&mut self, frame: &Frame<'_>) -> Result<()> {
            self.frames
                .push((frame.projection.visible_series(), frame.label(1).to_string()));
            Ok(())
        }
    }

    fn session() -> ChartSession<Recorder> {
        ChartSession::new(
            Dataset::demo(),
            ChartOptions::default(),
            &[2, 3],
            Recorder::default(),
        )
    }

    #[test]
    fn open_draws_default_projection() {
        let mut s = session();
        s.open().unwrap();
        assert_eq!(
            s.renderer().frames,
            vec![(vec![2, 3], HIDE_ALL_LABEL.to_string())]
        );
    }

    #[test]
    fn ignored_selections_do_not_redraw() {
        let mut s = session();
        assert_eq!(s.on_select(&[]).unwrap(), Transition::Ignored);
        assert_eq!(
            s.on_select(&[Selection::point(2, 3)]).unwrap(),
            Transition::Ignored
        );
        assert_eq!(s.click_legend(0).unwrap(), Transition::Ignored);
        assert!(s.renderer().frames.is_empty());
    }

    #[test]
    fn legend_clicks_redraw_with_new_projection() {
        let mut s = session();
        assert_eq!(s.click_legend(4).unwrap(), Transition::ShowSeries(4));
        assert_eq!(s.click_legend(1).unwrap(), Transition::HideAll);
        let frames = &s.renderer().frames;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].0, vec![2, 3, 4]);
        assert_eq!(frames[1], (vec![], "Show all".to_string()));
    }
}
