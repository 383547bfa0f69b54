//! Chart and dashboard configuration.
//!
//! Every option has a default matching the stock fixtures, so `{"kind": "bar"}` is a
//! complete chart description. Dashboards are JSON documents:
//!
//! ```json
//! {
//!   "title": "charts",
//!   "charts": [
//!     { "mount": "barchart", "data": "data/barchart.csv", "chart": { "kind": "bar" } },
//!     { "mount": "donutchart", "chart": { "kind": "donut" } }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The five chart types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Bar,
    StackedBar,
    Donut,
    Line,
    LineArea,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Bar,
        ChartKind::StackedBar,
        ChartKind::Donut,
        ChartKind::Line,
        ChartKind::LineArea,
    ];

    /// Container id the chart mounts into by default.
    pub fn default_mount(self) -> &'static str {
        match self {
            ChartKind::Bar => "barchart",
            ChartKind::StackedBar => "stackedbarchart",
            ChartKind::Donut => "donutchart",
            ChartKind::Line => "linechart",
            ChartKind::LineArea => "lineareachart",
        }
    }

    /// Stock fixture file name under the data directory (`None` for the inline donut).
    pub fn default_fixture(self) -> Option<&'static str> {
        match self {
            ChartKind::Bar => Some("barchart.csv"),
            ChartKind::StackedBar => Some("stackedbarchart.csv"),
            ChartKind::Donut => None,
            ChartKind::Line => Some("linechart.csv"),
            ChartKind::LineArea => Some("lineareachart.csv"),
        }
    }
}

/// Plot size and the outer spacing used to build the `viewBox`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    /// CSS margin of the `<svg>` element (px).
    pub margin: f64,
    /// CSS padding of the `<svg>` element (px).
    pub padding: f64,
    /// Room reserved around the plot for axes and labels.
    pub adj: f64,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 500.0,
            margin: 5.0,
            padding: 5.0,
            adj: 30.0,
        }
    }
}

impl Frame {
    pub fn for_kind(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Donut => Self {
                width: 450.0,
                height: 450.0,
                margin: 40.0,
                padding: 0.0,
                adj: 20.0,
            },
            ChartKind::LineArea => Self {
                adj: 20.0,
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarOptions {
    /// Category column; `Country`, then `cat`, when unset.
    pub category_column: Option<String>,
    /// Value column; `Value`, then `val`, when unset.
    pub value_column: Option<String>,
    /// Fixed upper bound of the y domain. Larger values overflow the plot.
    pub y_max: f64,
    pub band_padding: f64,
    pub fill: String,
}

impl Default for BarOptions {
    fn default() -> Self {
        Self {
            category_column: None,
            value_column: None,
            y_max: 13000.0,
            band_padding: 0.2,
            fill: crate::palette::BAR_FILL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackedBarOptions {
    /// Group column; the first column when unset. All other columns are subgroups.
    pub group_column: Option<String>,
    pub y_max: f64,
    pub band_padding: f64,
    pub colors: Vec<String>,
    /// Horizontal tooltip offset from the pointer (px).
    pub tooltip_offset: f64,
}

impl Default for StackedBarOptions {
    fn default() -> Self {
        Self {
            group_column: None,
            y_max: 60.0,
            band_padding: 0.2,
            colors: crate::palette::STACKED_BAR_COLORS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            tooltip_offset: 90.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineOptions {
    pub date_column: String,
    /// Added to every measurement when computing the y-domain maximum.
    pub headroom: f64,
    pub y_label: String,
    /// `chrono` format of the daily x-axis ticks.
    pub tick_format: String,
    pub tooltip_offset: f64,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            date_column: "date".into(),
            headroom: 4.0,
            y_label: "Frequency".into(),
            tick_format: "%b %d".into(),
            tooltip_offset: 25.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineAreaOptions {
    pub x_domain: (f64, f64),
    pub y_domain: (f64, f64),
    pub x_column: String,
    pub y_column: String,
    pub lower_column: String,
    pub upper_column: String,
}

impl Default for LineAreaOptions {
    fn default() -> Self {
        Self {
            x_domain: (1.0, 100.0),
            y_domain: (0.0, 13.0),
            x_column: "x".into(),
            y_column: "y".into(),
            lower_column: "CI_left".into(),
            upper_column: "CI_right".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DonutOptions {
    /// Inline slices, used when no fixture is given.
    pub values: IndexMap<String, f64>,
    pub key_column: String,
    pub value_column: String,
    /// Radii as fractions of the pie radius.
    pub inner_ratio: f64,
    pub outer_ratio: f64,
    pub label_ratio: f64,
}

impl Default for DonutOptions {
    fn default() -> Self {
        let values = [
            ("a", 9.0),
            ("b", 20.0),
            ("c", 30.0),
            ("d", 8.0),
            ("e", 12.0),
            ("f", 3.0),
            ("g", 7.0),
            ("h", 14.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Self {
            values,
            key_column: "key".into(),
            value_column: "value".into(),
            inner_ratio: 0.5,
            outer_ratio: 0.8,
            label_ratio: 0.9,
        }
    }
}

/// Per-kind options, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ChartOptions {
    Bar(BarOptions),
    StackedBar(StackedBarOptions),
    Donut(DonutOptions),
    Line(LineOptions),
    LineArea(LineAreaOptions),
}

impl ChartOptions {
    pub fn for_kind(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Bar => ChartOptions::Bar(BarOptions::default()),
            ChartKind::StackedBar => ChartOptions::StackedBar(StackedBarOptions::default()),
            ChartKind::Donut => ChartOptions::Donut(DonutOptions::default()),
            ChartKind::Line => ChartOptions::Line(LineOptions::default()),
            ChartKind::LineArea => ChartOptions::LineArea(LineAreaOptions::default()),
        }
    }

    pub fn kind(&self) -> ChartKind {
        match self {
            ChartOptions::Bar(_) => ChartKind::Bar,
            ChartOptions::StackedBar(_) => ChartKind::StackedBar,
            ChartOptions::Donut(_) => ChartKind::Donut,
            ChartOptions::Line(_) => ChartKind::Line,
            ChartOptions::LineArea(_) => ChartKind::LineArea,
        }
    }
}

/// Everything needed to render one chart from a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub frame: Frame,
    pub options: ChartOptions,
}

impl ChartConfig {
    pub fn new(options: ChartOptions) -> Self {
        Self {
            frame: Frame::for_kind(options.kind()),
            options,
        }
    }

    pub fn for_kind(kind: ChartKind) -> Self {
        Self::new(ChartOptions::for_kind(kind))
    }

    pub fn kind(&self) -> ChartKind {
        self.options.kind()
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.frame.width = width;
        self.frame.height = height;
        self
    }
}

/// One chart of a dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEntry {
    /// Id of the container element the chart is appended to.
    pub mount: String,
    /// Fixture path or URL. Relative paths resolve against the config file's directory.
    #[serde(default)]
    pub data: Option<String>,
    /// Frame override; the kind's default frame when absent.
    #[serde(default)]
    pub frame: Option<Frame>,
    pub chart: ChartOptions,
}

impl ChartEntry {
    pub fn config(&self) -> ChartConfig {
        let mut cfg = ChartConfig::new(self.chart.clone());
        if let Some(frame) = self.frame {
            cfg.frame = frame;
        }
        cfg
    }
}

/// A page of independent charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// Container ids present on the page; defaults to the mounts of `charts`.
    #[serde(default)]
    pub mounts: Option<Vec<String>>,
    pub charts: Vec<ChartEntry>,
}

fn default_title() -> String {
    "charts".to_string()
}

impl DashboardConfig {
    /// The five stock charts over fixtures in `data_dir`.
    pub fn stock(data_dir: &Path) -> Self {
        let charts = ChartKind::ALL
            .iter()
            .map(|&kind| ChartEntry {
                mount: kind.default_mount().to_string(),
                data: kind
                    .default_fixture()
                    .map(|f| data_dir.join(f).to_string_lossy().into_owned()),
                frame: None,
                chart: ChartOptions::for_kind(kind),
            })
            .collect();
        Self {
            title: default_title(),
            mounts: None,
            charts,
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("parse dashboard config")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read dashboard config {}", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Container ids on the page.
    pub fn mount_ids(&self) -> Vec<String> {
        match &self.mounts {
            Some(m) => m.clone(),
            None => {
                let mut ids: Vec<String> = Vec::new();
                for c in &self.charts {
                    if !ids.contains(&c.mount) {
                        ids.push(c.mount.clone());
                    }
                }
                ids
            }
        }
    }
}
