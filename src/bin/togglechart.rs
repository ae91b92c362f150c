use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use togglechart::viz::{FileRenderer, LegendMode};
use togglechart::{ChartConfig, ChartSession, Transition, VisibilityController};

#[derive(Parser, Debug)]
#[command(
    name = "togglechart",
    version,
    about = "Render line charts and toggle series by clicking legend entries"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply legend clicks in order and write the resulting chart (.svg or .png).
    Render(RenderArgs),
    /// Apply legend clicks in order and print the visibility state as JSON.
    State(ChartArgs),
    /// Print the chart's table as JSON.
    Dataset(ChartArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LegendArg {
    Right,
    Top,
    Bottom,
}

impl From<LegendArg> for LegendMode {
    fn from(l: LegendArg) -> Self {
        match l {
            LegendArg::Right => LegendMode::Right,
            LegendArg::Top => LegendMode::Top,
            LegendArg::Bottom => LegendMode::Bottom,
        }
    }
}

/// A click on a legend entry by column index (`3`) or on a canvas pixel (`850,40`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Click {
    Column(usize),
    At(i32, i32),
}

impl FromStr for Click {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(',') {
            Some((x, y)) => {
                let x = x.trim().parse().map_err(|_| format!("invalid x in {s:?}"))?;
                let y = y.trim().parse().map_err(|_| format!("invalid y in {s:?}"))?;
                Ok(Click::At(x, y))
            }
            None => s
                .trim()
                .parse()
                .map(Click::Column)
                .map_err(|_| format!("expected COLUMN or X,Y, got {s:?}")),
        }
    }
}

impl fmt::Display for Click {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Click::Column(c) => write!(f, "column {c}"),
            Click::At(x, y) => write!(f, "pixel {x},{y}"),
        }
    }
}

#[derive(Args, Debug)]
struct ChartArgs {
    /// JSON config file (options, default_visible, aggregate, table).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Columns visible when the chart opens, separated by comma or semicolon (e.g., 2,4,5).
    #[arg(short = 'd', long)]
    default_visible: Option<String>,
    /// Legend click, repeatable: a column index (1 = Hide/Show all) or X,Y canvas pixel.
    #[arg(short, long = "click")]
    clicks: Vec<Click>,
    /// Chart title.
    #[arg(long)]
    title: Option<String>,
    /// Locale for tick labels (en, de, fr, es, it, pt, nl).
    #[arg(long)]
    locale: Option<String>,
    /// Legend placement.
    #[arg(long, value_enum)]
    legend: Option<LegendArg>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    chart: ChartArgs,
    /// Output path (.svg or .png).
    #[arg(short, long)]
    out: PathBuf,
    /// Width of the chart (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the chart (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn parse_columns(s: &str) -> Result<Vec<usize>> {
    parse_list(s)
        .iter()
        .map(|x| {
            x.parse::<usize>()
                .map_err(|_| anyhow::anyhow!("invalid column index {x:?} in --default-visible"))
        })
        .collect()
}

/// Config file (or defaults) with command-line overrides applied.
fn load_config(args: &ChartArgs) -> Result<ChartConfig> {
    let mut cfg = match &args.config {
        Some(path) => ChartConfig::load(path)?,
        None => ChartConfig::default(),
    };
    if let Some(list) = &args.default_visible {
        cfg.default_visible = parse_columns(list)?;
    }
    if let Some(title) = &args.title {
        cfg.options.title = title.clone();
    }
    if let Some(locale) = &args.locale {
        cfg.options.locale = locale.clone();
    }
    if let Some(legend) = args.legend {
        cfg.options.legend = legend.into();
    }
    Ok(cfg)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::State(args) => cmd_state(args),
        Command::Dataset(args) => cmd_dataset(args),
    }
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    if !(200..=3000).contains(&args.width) || !(200..=3000).contains(&args.height) {
        bail!("chart dimensions must be between 200 and 3000 pixels");
    }
    let cfg = load_config(&args.chart)?;
    let dataset = cfg.dataset()?;
    let renderer = FileRenderer::new(&args.out, args.width, args.height);
    let mut session = ChartSession::new(dataset, cfg.options, &cfg.default_visible, renderer);
    session.open()?;

    for click in &args.chart.clicks {
        let transition = match *click {
            Click::Column(column) => session.click_legend(column)?,
            Click::At(x, y) => {
                let selection = session
                    .renderer()
                    .layout()
                    .and_then(|l| l.selection_at(x, y));
                session.on_select(selection.as_slice())?
            }
        };
        eprintln!("{click}: {transition}");
    }

    eprintln!(
        "Wrote chart to {} ({} draws)",
        args.out.display(),
        session.renderer().draws()
    );
    Ok(())
}

fn cmd_state(args: ChartArgs) -> Result<()> {
    let cfg = load_config(&args)?;
    let dataset = cfg.dataset()?;
    let mut controller =
        VisibilityController::new(&dataset).with_series_colors(&cfg.options.series_colors);
    controller.initialize(&cfg.default_visible);

    let mut transitions: Vec<Transition> = Vec::new();
    for click in &args.clicks {
        match *click {
            Click::Column(column) => transitions.push(controller.handle_legend_click(column)),
            Click::At(..) => bail!("pixel clicks need a rendered legend; use `render` instead"),
        }
    }

    let out = serde_json::json!({
        "transitions": transitions,
        "state": controller.snapshot(),
        "projection": controller.projection(),
        "styles": controller.style_map(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_dataset(args: ChartArgs) -> Result<()> {
    let cfg = load_config(&args)?;
    let dataset = cfg.dataset()?;
    println!("{}", serde_json::to_string_pretty(&dataset)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clicks_parse_as_column_or_pixel() {
        assert_eq!("3".parse::<Click>(), Ok(Click::Column(3)));
        assert_eq!("850, 40".parse::<Click>(), Ok(Click::At(850, 40)));
        assert!("x".parse::<Click>().is_err());
        assert!("1,".parse::<Click>().is_err());
    }

    #[test]
    fn column_lists_accept_both_separators() {
        assert_eq!(parse_columns("2, 4;5").unwrap(), vec![2, 4, 5]);
        assert!(parse_columns("2,a").is_err());
        assert!(parse_columns("").unwrap().is_empty());
    }
}
