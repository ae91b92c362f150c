//! togglechart
//!
//! A small Rust library for line charts whose series are shown and hidden by
//! clicking their legend entries. Pairs with the `togglechart` CLI and the
//! `togglechart-gui` desktop viewer.
//!
//! ### Features
//! - Build a category/series table with a synthetic "Hide all / Show all" column
//! - Track per-series visibility with a legend-click state machine
//! - Project the table into visible columns and muted placeholders for each draw
//! - Render SVG/PNG line charts and map legend pixels back to clicks
//!
//! ### Example
//! ```no_run
//! use togglechart::{ChartOptions, ChartSession, Dataset};
//! use togglechart::viz::FileRenderer;
//!
//! let renderer = FileRenderer::new("chart.svg", 1000, 600);
//! let mut session = ChartSession::new(Dataset::demo(), ChartOptions::default(), &[2, 4, 5], renderer);
//! session.open()?;
//! session.click_legend(1)?; // "Hide all"
//! assert!(session.controller().all_hidden());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod dataset;
pub mod models;
pub mod options;
pub mod session;
pub mod visibility;
pub mod viz;

pub use config::ChartConfig;
pub use dataset::{AggregateColumn, Dataset, DatasetBuilder};
pub use models::{Cell, Column, ColumnType, NamedSeries, Rgb};
pub use options::{ChartOptions, MUTED_COLOR};
pub use session::{ChartSession, Frame, Renderer, Selection};
pub use visibility::{
    ColumnProjection, ProjectedColumn, SeriesStyle, Transition, Visibility, VisibilityController,
};
