/*!
 * Desktop viewer for togglechart
 *
 * Draws the chart with the egui painter and routes legend clicks through the
 * same session and legend layout the CLI uses. The current view can be exported
 * to SVG or PNG.
 *
 * Usage: togglechart-gui [CONFIG.json]
 */

use anyhow::Result;
use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Rect, Shape, Stroke, pos2, vec2};
use std::collections::BTreeMap;
use std::path::PathBuf;
use togglechart::viz::types::{RIGHT_LEGEND_PLOT_PERCENT, Y_LABEL_COUNT};
use togglechart::viz::util::{format_tick, map_locale};
use togglechart::viz::{self, LegendLayout, LegendMode};
use togglechart::{
    ChartConfig, ChartSession, ColumnProjection, Frame, ProjectedColumn, Renderer, Rgb,
    Selection, SeriesStyle,
};

const EXPORT_SIZE: (u32, u32) = (1000, 600);
const POINT_HIT_RADIUS: f32 = 8.0;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 640.0])
            .with_min_inner_size([600.0, 400.0])
            .with_title("togglechart"),
        ..Default::default()
    };

    eframe::run_native(
        "togglechart",
        options,
        Box::new(move |_cc| Ok(Box::new(ToggleApp::new(config_path.as_deref())))),
    )
}

/// What the last draw asked for; painted every frame until the next transition.
struct Scene {
    projection: ColumnProjection,
    styles: BTreeMap<usize, SeriesStyle>,
}

#[derive(Default)]
struct SceneRenderer {
    scene: Option<Scene>,
}

impl Renderer for SceneRenderer {
    fn draw(&mut self, frame: &Frame<'_>) -> Result<()> {
        self.scene = Some(Scene {
            projection: frame.projection.clone(),
            styles: frame.styles.clone(),
        });
        Ok(())
    }
}

struct ToggleApp {
    session: ChartSession<SceneRenderer>,
    export_dir: PathBuf,
    status_message: String,
    error_message: String,
}

impl ToggleApp {
    fn new(config_path: Option<&std::path::Path>) -> Self {
        let mut error_message = String::new();
        let cfg = match config_path.map(ChartConfig::load) {
            Some(Ok(cfg)) => cfg,
            Some(Err(e)) => {
                error_message = format!("{e}; showing the demo chart");
                ChartConfig::default()
            }
            None => ChartConfig::default(),
        };
        let dataset = cfg.dataset().unwrap_or_else(|e| {
            error_message = format!("{e}; showing the demo chart");
            togglechart::Dataset::demo()
        });

        let mut session = ChartSession::new(
            dataset,
            cfg.options,
            &cfg.default_visible,
            SceneRenderer::default(),
        );
        if let Err(e) = session.open() {
            error_message = e.to_string();
        }

        // Default to the user's home directory for exports
        let export_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        Self {
            session,
            export_dir,
            status_message: String::new(),
            error_message,
        }
    }

    fn select(&mut self, selection: Option<Selection>) {
        match self.session.on_select(selection.as_slice()) {
            Ok(t) if t.changed() => {
                self.status_message = t.to_string();
                self.error_message.clear();
            }
            Ok(_) => {}
            Err(e) => self.error_message = e.to_string(),
        }
    }

    fn export(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("SVG image", &["svg"])
            .add_filter("PNG image", &["png"])
            .set_directory(&self.export_dir)
            .set_file_name("chart.svg")
            .save_file()
        else {
            return;
        };
        let (w, h) = EXPORT_SIZE;
        match self
            .session
            .with_frame(|frame| viz::render_chart(frame, &path, w, h))
        {
            Ok(_) => {
                self.status_message = format!("Exported {}", path.display());
                self.error_message.clear();
                if let Some(dir) = path.parent() {
                    self.export_dir = dir.to_path_buf();
                }
            }
            Err(e) => self.error_message = format!("Export failed: {e}"),
        }
    }

    fn chart_ui(&mut self, ui: &mut egui::Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click());
        let Some(scene) = &self.session.renderer().scene else {
            return;
        };
        let frame = Frame {
            dataset: self.session.dataset(),
            projection: &scene.projection,
            styles: &scene.styles,
            options: self.session.options(),
        };
        let painted = paint_chart(ui.painter(), rect, &frame);

        if response.clicked()
            && let Some(pos) = response.interact_pointer_pos()
        {
            let local = pos - rect.min;
            let selection = painted
                .legend
                .selection_at(local.x as i32, local.y as i32)
                .or_else(|| painted.point_at(pos));
            self.select(selection);
        }
    }
}

impl eframe::App for ToggleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("togglechart");
                ui.separator();
                if ui.button("Export…").clicked() {
                    self.export();
                }
                ui.label(format!(
                    "Visible: {:?}",
                    self.session.controller().visible_series()
                ));
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            if !self.status_message.is_empty() {
                ui.colored_label(Color32::DARK_GREEN, &self.status_message);
            }
            if !self.error_message.is_empty() {
                ui.colored_label(Color32::RED, &self.error_message);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| self.chart_ui(ui));
    }
}

/// Screen positions of what was painted, for mapping clicks back.
struct Painted {
    legend: LegendLayout,
    points: Vec<(Pos2, usize, usize)>,
}

impl Painted {
    /// Nearest drawn point within [`POINT_HIT_RADIUS`], as a row/column selection.
    fn point_at(&self, pos: Pos2) -> Option<Selection> {
        self.points
            .iter()
            .map(|&(p, row, column)| (p.distance(pos), row, column))
            .filter(|&(d, ..)| d <= POINT_HIT_RADIUS)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, row, column)| Selection::point(row, column))
    }
}

fn color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.r, c.g, c.b)
}

fn rgba32(c: plotters::style::RGBAColor) -> Color32 {
    Color32::from_rgb(c.0, c.1, c.2)
}

/// Paint `frame` into `rect`. The legend always sits on the right here.
fn paint_chart(painter: &egui::Painter, rect: Rect, frame: &Frame<'_>) -> Painted {
    let dataset = frame.dataset;
    let options = frame.options;
    let axis_color = Color32::from_gray(90);
    let grid_color = Color32::from_gray(220);

    painter.rect_filled(rect, 0.0, color32(options.background_color));

    let legend_w = rect.width() * (100 - RIGHT_LEGEND_PLOT_PERCENT) as f32 / 100.0;
    let plot = Rect::from_min_max(
        pos2(rect.left() + 72.0, rect.top() + 48.0),
        pos2(rect.right() - legend_w - 16.0, rect.bottom() - 48.0),
    );
    if plot.width() <= 0.0 || plot.height() <= 0.0 {
        return Painted {
            legend: LegendLayout::default(),
            points: Vec::new(),
        };
    }

    let title = options.title.trim();
    if !title.is_empty() {
        painter.text(
            pos2(plot.center().x, rect.top() + 22.0),
            Align2::CENTER_CENTER,
            title,
            FontId::proportional(20.0),
            Color32::BLACK,
        );
    }

    let (y_min, y_max) = options.y_range(dataset.value_range(dataset.data_series_indices()));
    let (num_locale, dec_sep) = map_locale(&options.locale);
    let x_span = dataset.row_count().saturating_sub(1).max(1) as f32 + 0.5;
    let to_screen = |x: f64, y: f64| {
        pos2(
            plot.left() + (x as f32 + 0.25) / x_span * plot.width(),
            plot.bottom() - ((y - y_min) / (y_max - y_min)) as f32 * plot.height(),
        )
    };

    // grid & y ticks
    for k in 0..=Y_LABEL_COUNT {
        let v = y_min + (y_max - y_min) * k as f64 / Y_LABEL_COUNT as f64;
        let y = to_screen(0.0, v).y;
        painter.line_segment(
            [pos2(plot.left(), y), pos2(plot.right(), y)],
            Stroke::new(1.0, grid_color),
        );
        painter.text(
            pos2(plot.left() - 6.0, y),
            Align2::RIGHT_CENTER,
            format_tick(v, num_locale, dec_sep),
            FontId::proportional(12.0),
            axis_color,
        );
    }
    for (i, category) in dataset.categories().iter().enumerate() {
        let x = to_screen(i as f64, y_min).x;
        painter.text(
            pos2(x, plot.bottom() + 6.0),
            Align2::CENTER_TOP,
            category,
            FontId::proportional(12.0),
            axis_color,
        );
    }
    painter.line_segment(
        [plot.left_bottom(), plot.right_bottom()],
        Stroke::new(1.0, axis_color),
    );
    painter.line_segment(
        [plot.left_top(), plot.left_bottom()],
        Stroke::new(1.0, axis_color),
    );

    if let Some(t) = options
        .h_axis
        .title
        .as_deref()
        .or_else(|| dataset.column(0).map(|c| c.label.as_str()))
    {
        painter.text(
            pos2(plot.center().x, rect.bottom() - 12.0),
            Align2::CENTER_CENTER,
            t,
            FontId::proportional(14.0),
            axis_color,
        );
    }
    if let Some(t) = options.v_axis.title.as_deref() {
        painter.text(
            pos2(rect.left() + 8.0, plot.top() - 14.0),
            Align2::LEFT_CENTER,
            t,
            FontId::proportional(14.0),
            axis_color,
        );
    }

    // series
    let mut points = Vec::new();
    for projected in frame.projection.iter() {
        let ProjectedColumn::PassThrough { index } = *projected else {
            continue;
        };
        if !dataset.is_data_series(index) {
            continue;
        }
        let color = rgba32(viz::column_color(frame, index));
        for run in viz::segments(&dataset.series_values(index)) {
            let screen: Vec<Pos2> = run.iter().map(|&(x, y)| to_screen(x, y)).collect();
            if screen.len() > 1 {
                painter.add(Shape::line(screen.clone(), Stroke::new(2.0, color)));
            }
            for (&(x, _), &p) in run.iter().zip(&screen) {
                painter.circle_filled(p, 3.0, color);
                points.push((p, x as usize, index));
            }
        }
    }

    // legend
    let entries = viz::legend_entries(frame);
    let labels: Vec<(usize, &str)> = entries
        .iter()
        .map(|e| (e.column, e.label.as_str()))
        .collect();
    let legend_x = (rect.width() - legend_w) as i32;
    let legend = LegendLayout::compute(&labels, LegendMode::Right, legend_w as i32, 0)
        .placed_at((legend_x, plot.top() as i32 - rect.top() as i32));
    let origin = rect.min + vec2(legend.origin.0 as f32, legend.origin.1 as f32);
    for slot in &legend.slots {
        let Some(entry) = entries.iter().find(|e| e.column == slot.column) else {
            continue;
        };
        let color = rgba32(entry.color);
        let y = origin.y + (slot.y0 + slot.y1) as f32 / 2.0;
        painter.circle_filled(pos2(origin.x + slot.x0 as f32 + 4.0, y), 4.0, color);
        painter.text(
            pos2(origin.x + slot.x0 as f32 + 16.0, y),
            Align2::LEFT_CENTER,
            &slot.text,
            FontId::proportional(14.0),
            if entry.muted { color } else { Color32::BLACK },
        );
    }

    Painted { legend, points }
}
