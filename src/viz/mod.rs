//! Visualization: render a [`Frame`] to **SVG** or **PNG** with plotters.
//!
//! - Pass-through columns are drawn as lines with point markers; nulls break the line
//! - Placeholder columns draw nothing but keep their legend entry
//! - Muted legend entries are drawn in the muted color
//! - Locale-aware tick labels (`2,000` vs `2.000`)
//!
//! [`render_chart`] returns the [`LegendLayout`] it drew, which maps canvas
//! pixels back to legend clicks.

pub mod legend;
pub mod text;
pub mod types;
pub mod util;

pub use legend::{LegendEntry, LegendLayout, LegendSlot};
pub use types::LegendMode;

use crate::dataset::CATEGORY_INDEX;
use crate::session::{Frame, Renderer};
use crate::visibility::ProjectedColumn;
use anyhow::{Result, anyhow};
use log::debug;

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::LineSeries;
use plotters::style::FontFamily;

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::{Path, PathBuf};
use std::sync::Once;

use legend::draw_legend;
use types::{RIGHT_LEGEND_PLOT_PERCENT, Y_LABEL_COUNT};
use util::{compute_left_label_area_px, format_tick, map_locale, office_color, to_plotters};

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        if plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        )
        .is_err()
        {
            log::warn!("bundled font could not be registered; text may not render");
        }
    });
}

/// Color a column is drawn with: its style override, else the palette color of its series index.
pub fn column_color(frame: &Frame<'_>, column: usize) -> RGBAColor {
    match frame.style(column).and_then(|s| s.color) {
        Some(c) => to_plotters(c).to_rgba(),
        None => office_color(column.saturating_sub(1)),
    }
}

/// Legend entries for every column except the category axis, in column order.
pub fn legend_entries(frame: &Frame<'_>) -> Vec<LegendEntry> {
    (CATEGORY_INDEX + 1..frame.dataset.column_count())
        .map(|column| LegendEntry {
            column,
            label: frame.label(column).to_string(),
            color: column_color(frame, column),
            muted: frame.style(column).is_some_and(|s| s.is_muted()),
        })
        .collect()
}

/// Split a column's values into contiguous non-null runs of `(x, y)` points.
pub fn segments(values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut cur = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(y) => cur.push((i as f64, *y)),
            None if !cur.is_empty() => out.push(std::mem::take(&mut cur)),
            None => {}
        }
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

/// Draw `frame` to `out_path` (`.svg` by extension, PNG otherwise).
pub fn render_chart<P: AsRef<Path>>(
    frame: &Frame<'_>,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<LegendLayout> {
    if frame.dataset.row_count() == 0 {
        return Err(anyhow!("no data to plot"));
    }
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    let layout = if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_chart(root, frame)?
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_chart(root, frame)?
    };
    debug!(
        "rendered {} ({} legend entries)",
        out_path.display(),
        layout.slots.len()
    );
    Ok(layout)
}

fn draw_chart<DB>(root: DrawingArea<DB, Shift>, frame: &Frame<'_>) -> Result<LegendLayout>
where
    DB: DrawingBackend,
{
    const MARGIN: i32 = 16;
    let dataset = frame.dataset;
    let options = frame.options;

    root.fill(&to_plotters(options.background_color))
        .map_err(|e| anyhow!("{:?}", e))?;

    // Y range over every data series so the axis stays put while toggling.
    let (y_min, y_max) = options.y_range(dataset.value_range(dataset.data_series_indices()));
    let (num_locale, dec_sep) = map_locale(&options.locale);
    let left_label_px =
        compute_left_label_area_px(y_min, y_max, Y_LABEL_COUNT, 12, num_locale, dec_sep);
    let axis_x_start_px = MARGIN + left_label_px as i32;

    // ----------------------------
    // 1) Legend layout & area split
    // ----------------------------
    let entries = legend_entries(frame);
    let labels: Vec<(usize, &str)> = entries
        .iter()
        .map(|e| (e.column, e.label.as_str()))
        .collect();

    let (root_w_u32, root_h_u32) = root.dim_in_pixel();
    let (root_w, root_h) = (root_w_u32 as i32, root_h_u32 as i32);

    let (plot_area, legend_area, layout) = match options.legend {
        LegendMode::Right => {
            let plot_w = root_w * RIGHT_LEGEND_PLOT_PERCENT / 100;
            let layout = LegendLayout::compute(&labels, LegendMode::Right, root_w - plot_w, 0)
                .placed_at((plot_w, 0));
            let (plot, legend) = root.split_horizontally(plot_w);
            (plot, legend, layout)
        }
        LegendMode::Top => {
            let layout = LegendLayout::compute(&labels, LegendMode::Top, root_w, axis_x_start_px);
            let (legend, plot) = root.split_vertically(layout.height);
            (plot, legend, layout)
        }
        LegendMode::Bottom => {
            let layout =
                LegendLayout::compute(&labels, LegendMode::Bottom, root_w, axis_x_start_px);
            let split = (root_h - layout.height).max(40);
            let (plot, legend) = root.split_vertically(split);
            (plot, legend, layout.placed_at((0, split)))
        }
    };

    // ----------------------------
    // 2) Chart & mesh
    // ----------------------------
    let categories = dataset.categories();
    let x_max = categories.len().saturating_sub(1).max(1) as f64;

    let mut builder = ChartBuilder::on(&plot_area);
    builder
        .margin(MARGIN as u32)
        .set_label_area_size(LabelAreaPosition::Left, left_label_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 56);
    let title = options.title.trim();
    if !title.is_empty() {
        builder.caption(title, (FontFamily::SansSerif, 24));
    }
    let mut chart = builder
        .build_cartesian_2d(-0.25..x_max + 0.25, y_min..y_max)
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_label_fmt = |x: &f64| {
        let i = x.round();
        if (x - i).abs() < 1e-6 && i >= 0.0 {
            categories.get(i as usize).cloned().unwrap_or_default()
        } else {
            String::new()
        }
    };
    let y_label_fmt = |v: &f64| format_tick(*v, num_locale, dec_sep);

    let x_title = options
        .h_axis
        .title
        .clone()
        .or_else(|| dataset.column(CATEGORY_INDEX).map(|c| c.label.clone()))
        .unwrap_or_default();
    let y_title = options.v_axis.title.clone().unwrap_or_default();

    chart
        .configure_mesh()
        .x_desc(x_title)
        .y_desc(y_title)
        .x_labels(categories.len().clamp(2, 24))
        .y_labels(Y_LABEL_COUNT)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    // ----------------------------
    // 3) Series (pass-through columns only)
    // ----------------------------
    for projected in frame.projection.iter() {
        let ProjectedColumn::PassThrough { index } = *projected else {
            continue;
        };
        if index == CATEGORY_INDEX {
            continue;
        }
        let color = column_color(frame, index);
        for run in segments(&dataset.series_values(index)) {
            chart
                .draw_series(LineSeries::new(
                    run.clone(),
                    ShapeStyle {
                        color,
                        filled: false,
                        stroke_width: 2,
                    },
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
            chart
                .draw_series(run.into_iter().map(|p| Circle::new(p, 3, color.filled())))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
    }

    // ----------------------------
    // 4) Legend & present
    // ----------------------------
    draw_legend(&legend_area, &layout, &entries)?;

    plot_area.present().map_err(|e| anyhow!("{:?}", e))?;
    legend_area.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(layout)
}

/// [`Renderer`] that rewrites an image file on every draw.
#[derive(Debug, Clone)]
pub struct FileRenderer {
    path: PathBuf,
    width: u32,
    height: u32,
    layout: Option<LegendLayout>,
    draws: usize,
}

impl FileRenderer {
    pub fn new<P: Into<PathBuf>>(path: P, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            width,
            height,
            layout: None,
            draws: 0,
        }
    }

    /// Legend layout of the most recent draw.
    pub fn layout(&self) -> Option<&LegendLayout> {
        self.layout.as_ref()
    }

    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl Renderer for FileRenderer {
    fn draw(&mut self, frame: &Frame<'_>) -> Result<()> {
        self.layout = Some(render_chart(frame, &self.path, self.width, self.height)?);
        self.draws += 1;
        Ok(())
    }
}
