//! Legend layout, drawing and hit-testing.
//!
//! The layout is computed once per draw, in band-local pixels, and then placed at
//! the band's origin on the canvas. The same [`LegendLayout`] drives drawing and
//! maps pointer positions back to legend clicks, so what is drawn is what is hit.

use anyhow::{Result, anyhow};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::{Deserialize, Serialize};

use super::text::{estimate_text_width_px, truncate_to_width};
use super::types::LegendMode;
use crate::session::Selection;

// Layout constants shared by layout and drawing.
const FONT_PX: u32 = 14;
const LINE_H: i32 = FONT_PX as i32 + 4;
const ROW_GAP: i32 = 6;
const PAD: i32 = 8;
const MARKER_RADIUS: i32 = 4;
/// Marker plus the gap before the text.
const TEXT_INDENT: i32 = 2 * MARKER_RADIUS + 8;
const TRAILING_GAP: i32 = 16;
const MIN_BAND_H: i32 = 40;

/// One legend entry as the renderer sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub column: usize,
    pub label: String,
    pub color: RGBAColor,
    pub muted: bool,
}

/// Clickable rectangle of one entry, band-local, `x1`/`y1` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendSlot {
    pub column: usize,
    pub text: String,
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl LegendSlot {
    fn contains(&self, x: i32, y: i32) -> bool {
        (self.x0..self.x1).contains(&x) && (self.y0..self.y1).contains(&y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegendLayout {
    pub mode: LegendMode,
    pub slots: Vec<LegendSlot>,
    /// Band height needed for Top/Bottom placement.
    pub height: i32,
    /// Canvas position of the band's top-left corner.
    pub origin: (i32, i32),
}

impl LegendLayout {
    /// Lay out `(column, label)` pairs in a band `band_w` pixels wide.
    ///
    /// Right: one entry per line. Top/Bottom: entries flow left to right from
    /// `start_x` (aligned with the plot's X axis) and wrap into rows.
    pub fn compute(labels: &[(usize, &str)], mode: LegendMode, band_w: i32, start_x: i32) -> Self {
        let mut slots = Vec::with_capacity(labels.len());
        let mut y = PAD;

        match mode {
            LegendMode::Right => {
                let max_text_w = (band_w - PAD * 2 - TEXT_INDENT).max(24) as u32;
                for &(column, label) in labels {
                    let text = truncate_to_width(label, FONT_PX, max_text_w);
                    let text_w = estimate_text_width_px(&text, FONT_PX) as i32;
                    slots.push(LegendSlot {
                        column,
                        text,
                        x0: PAD,
                        y0: y,
                        x1: PAD + TEXT_INDENT + text_w,
                        y1: y + LINE_H,
                    });
                    y += LINE_H + ROW_GAP;
                }
            }
            LegendMode::Top | LegendMode::Bottom => {
                let start_x = start_x.max(PAD);
                let usable_w = band_w - PAD;
                let per_item_cap = (((usable_w - start_x) as f32) * 0.35).max(140.0) as u32;
                let mut x = start_x;
                for &(column, label) in labels {
                    let text = truncate_to_width(label, FONT_PX, per_item_cap);
                    let text_w = estimate_text_width_px(&text, FONT_PX) as i32;
                    let block_w = TEXT_INDENT + text_w + TRAILING_GAP;
                    if x + block_w > usable_w && x > start_x {
                        x = start_x;
                        y += LINE_H + ROW_GAP;
                    }
                    slots.push(LegendSlot {
                        column,
                        text,
                        x0: x,
                        y0: y,
                        x1: x + TEXT_INDENT + text_w,
                        y1: y + LINE_H,
                    });
                    x += block_w;
                }
            }
        }

        let height = if slots.is_empty() {
            MIN_BAND_H
        } else {
            (y + LINE_H + PAD).max(MIN_BAND_H)
        };
        Self {
            mode,
            slots,
            height,
            origin: (0, 0),
        }
    }

    pub fn placed_at(mut self, origin: (i32, i32)) -> Self {
        self.origin = origin;
        self
    }

    /// Column whose entry covers the canvas pixel `(x, y)`.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<usize> {
        let lx = x.checked_sub(self.origin.0)?;
        let ly = y.checked_sub(self.origin.1)?;
        self.slots
            .iter()
            .find(|s| s.contains(lx, ly))
            .map(|s| s.column)
    }

    /// The legend selection a click at `(x, y)` produces, if it lands on an entry.
    pub fn selection_at(&self, x: i32, y: i32) -> Option<Selection> {
        self.hit_test(x, y).map(Selection::legend)
    }

    pub fn slot(&self, column: usize) -> Option<&LegendSlot> {
        self.slots.iter().find(|s| s.column == column)
    }

    /// Canvas-space center of an entry, handy for synthesizing clicks.
    pub fn center_of(&self, column: usize) -> Option<(i32, i32)> {
        self.slot(column).map(|s| {
            (
                self.origin.0 + (s.x0 + s.x1) / 2,
                self.origin.1 + (s.y0 + s.y1) / 2,
            )
        })
    }
}

/// Draw the legend band. Muted entries render marker and text in their muted color.
pub fn draw_legend<DB: DrawingBackend>(
    legend_area: &DrawingArea<DB, Shift>,
    layout: &LegendLayout,
    entries: &[LegendEntry],
) -> Result<()> {
    for slot in &layout.slots {
        let Some(entry) = entries.iter().find(|e| e.column == slot.column) else {
            continue;
        };
        let y_center = (slot.y0 + slot.y1) / 2;
        legend_area
            .draw(&Circle::new(
                (slot.x0 + MARKER_RADIUS, y_center),
                MARKER_RADIUS,
                entry.color.filled(),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;

        let text_color = if entry.muted { entry.color } else { BLACK.to_rgba() };
        let style = TextStyle::from((FontFamily::SansSerif, FONT_PX))
            .pos(Pos::new(HPos::Left, VPos::Center))
            .color(&text_color);
        legend_area
            .draw(&Text::new(
                slot.text.as_str(),
                (slot.x0 + TEXT_INDENT, y_center),
                style,
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}
