use anyhow::{Context, Result};
use chartdeck::config::{ChartConfig, ChartKind, DashboardConfig};
use chartdeck::loader::{FixtureSource, load_fixture};
use chartdeck::{charts, export, page, raster};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "chartdeck",
    version,
    about = "Render bar, stacked bar, donut, line and confidence-area charts from CSV/JSON fixtures"
)]
struct Cli {
    /// TTF/OTF font used for text in PNG output.
    #[arg(long, global = true)]
    font: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single chart to .svg or .png.
    Render(RenderArgs),
    /// Render a dashboard of charts into one HTML page.
    Page(PageArgs),
    /// Print the columns and row count of a fixture.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Chart type.
    #[arg(short, long, value_enum)]
    kind: ChartKind,
    /// Fixture path or http(s) URL. Defaults to the stock fixture under --data-dir.
    #[arg(short, long)]
    data: Option<String>,
    /// Directory holding the stock fixtures.
    #[arg(long, default_value = "assets/data")]
    data_dir: PathBuf,
    /// Output file (.svg or .png).
    #[arg(short, long)]
    out: PathBuf,
    /// Plot width in user units (the chart's default when omitted).
    #[arg(long)]
    width: Option<f64>,
    /// Plot height in user units (the chart's default when omitted).
    #[arg(long)]
    height: Option<f64>,
}

#[derive(Args, Debug)]
struct PageArgs {
    /// Dashboard config (JSON). Without it the five stock charts are rendered.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory holding the stock fixtures (used without --config).
    #[arg(long, default_value = "assets/data")]
    data_dir: PathBuf,
    /// Output HTML file.
    #[arg(short, long, default_value = "index.html")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Fixture path or http(s) URL.
    #[arg(short, long)]
    data: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    if let Some(font) = &cli.font {
        raster::register_font_file(font)?;
    }
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Page(args) => cmd_page(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let mut config = ChartConfig::for_kind(args.kind);
    if let Some(w) = args.width {
        config.frame.width = w;
    }
    if let Some(h) = args.height {
        config.frame.height = h;
    }

    let dataset = match (&args.data, args.kind.default_fixture()) {
        (Some(d), _) => {
            let source = FixtureSource::from(d.as_str());
            load_fixture(&source).with_context(|| format!("load fixture {source}"))?
        }
        (None, Some(stock)) => {
            let source = FixtureSource::from(args.data_dir.join(stock));
            load_fixture(&source).with_context(|| format!("load fixture {source}"))?
        }
        (None, None) => charts::inline_dataset(&config)
            .ok_or_else(|| anyhow::anyhow!("no data for {:?} chart", args.kind))?,
    };

    let chart = charts::render_chart(&dataset, &config)?;
    export::save_chart(&chart, &args.out)?;
    eprintln!("Wrote {:?} chart to {}", args.kind, args.out.display());
    Ok(())
}

fn cmd_page(args: PageArgs) -> Result<()> {
    let (config, base) = match &args.config {
        Some(path) => {
            let cfg = DashboardConfig::load(path)?;
            let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (cfg, base)
        }
        None => (DashboardConfig::stock(&args.data_dir), PathBuf::new()),
    };
    let dash = page::render_dashboard(&config, &base);
    dash.write_html(&args.out)?;
    eprintln!(
        "Wrote {} to {} ({} charts, {} failed)",
        config.title,
        args.out.display(),
        dash.rendered_count(),
        dash.failures.len()
    );
    for f in &dash.failures {
        eprintln!("  {}: {}", f.mount, f.reason);
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> Result<()> {
    let source = FixtureSource::from(args.data.as_str());
    let dataset = load_fixture(&source).with_context(|| format!("load fixture {source}"))?;
    println!("columns: {}", dataset.columns.join(", "));
    println!("rows: {}", dataset.len());
    Ok(())
}
