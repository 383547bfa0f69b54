//! chartdeck
//!
//! Render five static charts from small CSV/JSON fixtures: bar, stacked bar, donut,
//! multi-series line and line with a confidence band. Pairs with the `chartdeck` CLI.
//!
//! ### Features
//! - Load fixtures from disk or over HTTP, keeping column order
//! - d3-compatible band, linear and time scales with "nice" ticks
//! - Charts as keyed scene graphs, diffable into enter/update/exit patches
//! - Hover state machine for tooltips and focus markers
//! - Output as standalone SVG, a multi-chart HTML page, or PNG
//!
//! ### Example
//! ```no_run
//! use chartdeck::config::{ChartConfig, ChartKind};
//! use chartdeck::loader::{FixtureSource, load_fixture};
//!
//! let data = load_fixture(&FixtureSource::from("assets/data/barchart.csv"))?;
//! let chart = chartdeck::render_chart(&data, &ChartConfig::for_kind(ChartKind::Bar))?;
//! chartdeck::export::save_chart(&chart, "bar.svg")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod axis;
pub mod charts;
pub mod config;
pub mod export;
pub mod interaction;
pub mod loader;
pub mod models;
pub mod page;
pub mod palette;
pub mod raster;
pub mod scale;
pub mod scene;
pub mod shape;
pub mod svg;

pub use charts::{ChartError, ChartScene, render_chart};
pub use config::{ChartConfig, ChartKind, DashboardConfig};
pub use interaction::{HoverMachine, PointerEvent};
pub use loader::{LoadError, load_fixture};
pub use models::{Dataset, Field, Record};
