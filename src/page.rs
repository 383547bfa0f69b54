//! Dashboard rendering and the HTML page that hosts the charts.
//!
//! Charts are rendered one after another and never depend on each other: a fixture
//! that fails to load or a chart that fails to render is logged and leaves its container
//! empty, while the rest of the page is still produced.

use crate::charts::{ChartScene, inline_dataset, render_chart};
use crate::config::{ChartEntry, DashboardConfig};
use crate::loader::{FixtureSource, load_fixture};
use crate::models::Dataset;
use crate::svg::escape_xml;
use anyhow::{Context, Result, anyhow};
use indexmap::IndexMap;
use std::fmt::Write as _;
use std::path::Path;

/// A chart that could not be drawn, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub mount: String,
    pub reason: String,
}

/// Every mount point of the page with the charts rendered into it.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub title: String,
    /// Mount id to its charts, in page order. Empty for failed charts.
    pub mounts: IndexMap<String, Vec<ChartScene>>,
    pub failures: Vec<Failure>,
}

impl Dashboard {
    pub fn chart(&self, mount: &str) -> Option<&ChartScene> {
        self.mounts.get(mount).and_then(|c| c.first())
    }

    pub fn rendered_count(&self) -> usize {
        self.mounts.values().map(Vec::len).sum()
    }

    /// The full HTML document.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n<h1>{}</h1>\n",
            escape_xml(&self.title),
            STYLESHEET,
            escape_xml(&self.title)
        );
        for (mount, charts) in &self.mounts {
            let _ = writeln!(out, "<div id=\"{}\" class=\"chart\">", escape_xml(mount));
            for chart in charts {
                out.push_str(&chart.to_svg());
            }
            out.push_str("</div>\n");
            if charts.iter().any(ChartScene::has_tooltip) {
                let _ = writeln!(
                    out,
                    "<div class=\"tooltip\" data-for=\"{}\" style=\"opacity: 0; position: absolute;\"></div>",
                    escape_xml(mount)
                );
            }
        }
        out.push_str("</body>\n</html>\n");
        out
    }

    pub fn write_html<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create output directory {}", dir.display()))?;
        }
        std::fs::write(path, self.to_html()).with_context(|| format!("write {}", path.display()))
    }
}

const STYLESHEET: &str = "\
.chart { display: inline-block; position: relative; width: 100%; vertical-align: top; overflow: hidden; }
.svg-content { display: inline-block; position: relative; top: 0; left: 0; }
.tooltip { background-color: white; border: solid 1px; border-radius: 5px; padding: 10px; pointer-events: none; }
.serie_label { font: 10px sans-serif; }
";

/// Load the data one entry needs: its fixture, or the chart's inline data.
fn entry_dataset(entry: &ChartEntry, base: &Path) -> Result<Dataset> {
    match &entry.data {
        Some(data) => {
            let source = FixtureSource::from(data.as_str()).resolve_against(base);
            load_fixture(&source).with_context(|| format!("load fixture {source}"))
        }
        None => inline_dataset(&entry.config())
            .ok_or_else(|| anyhow!("no fixture configured for {:?} chart", entry.chart.kind())),
    }
}

fn render_entry(entry: &ChartEntry, base: &Path) -> Result<ChartScene> {
    let data = entry_dataset(entry, base)?;
    Ok(render_chart(&data, &entry.config())?)
}

/// Render every chart of `config`; relative fixture paths resolve against `base`.
pub fn render_dashboard(config: &DashboardConfig, base: &Path) -> Dashboard {
    let mut dash = Dashboard {
        title: config.title.clone(),
        mounts: config
            .mount_ids()
            .into_iter()
            .map(|m| (m, Vec::new()))
            .collect(),
        failures: Vec::new(),
    };
    for entry in &config.charts {
        let Some(slot) = dash.mounts.get_mut(&entry.mount) else {
            log::warn!("no container `{}` on the page, chart skipped", entry.mount);
            continue;
        };
        match render_entry(entry, base) {
            Ok(chart) => slot.push(chart),
            Err(e) => {
                log::warn!("chart `{}` left empty: {:#}", entry.mount, e);
                dash.failures.push(Failure {
                    mount: entry.mount.clone(),
                    reason: format!("{:#}", e),
                });
            }
        }
    }
    log::info!(
        "dashboard: {} charts rendered, {} failed",
        dash.rendered_count(),
        dash.failures.len()
    );
    dash
}
