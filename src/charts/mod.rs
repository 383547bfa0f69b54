//! Chart orchestrators: dataset + config in, [`ChartScene`] out.
//!
//! Each routine picks its columns, builds scales, lays out shapes and axes, and records
//! the hover [`Behavior`] of the chart. Rendering is pure; loading fixtures and writing
//! output happen around it (see [`crate::page`] and the CLI).

pub mod bar;
pub mod donut;
pub mod line;
pub mod line_area;
pub mod stacked_bar;

use crate::config::{ChartConfig, ChartKind, ChartOptions, Frame};
use crate::interaction::{Behavior, HoverMachine};
use crate::models::{Dataset, Record};
use crate::scene::Scene;
use crate::svg::to_svg_string;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("{kind:?} chart: column `{column}` not found (columns: {available:?})")]
    MissingColumn {
        kind: ChartKind,
        column: String,
        available: Vec<String>,
    },
    #[error("{kind:?} chart: {reason}")]
    EmptyDataset { kind: ChartKind, reason: String },
}

/// A rendered chart: its scene plus what hovering does.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartScene {
    pub kind: ChartKind,
    pub scene: Scene,
    pub behavior: Behavior,
}

impl ChartScene {
    pub fn hover_machine(&self) -> HoverMachine {
        HoverMachine::new(self.behavior.clone())
    }

    pub fn has_tooltip(&self) -> bool {
        self.behavior.has_tooltip()
    }

    pub fn to_svg(&self) -> String {
        to_svg_string(&self.scene)
    }
}

/// Render `dataset` as the chart described by `config`.
pub fn render_chart(dataset: &Dataset, config: &ChartConfig) -> Result<ChartScene, ChartError> {
    let frame = &config.frame;
    let chart = match &config.options {
        ChartOptions::Bar(opts) => bar::render(dataset, frame, opts)?,
        ChartOptions::StackedBar(opts) => stacked_bar::render(dataset, frame, opts)?,
        ChartOptions::Donut(opts) => donut::render(dataset, frame, opts)?,
        ChartOptions::Line(opts) => line::render(dataset, frame, opts)?,
        ChartOptions::LineArea(opts) => line_area::render(dataset, frame, opts)?,
    };
    log::debug!(
        "rendered {:?} chart: {} records, {} nodes",
        chart.kind,
        dataset.len(),
        chart.scene.nodes().len()
    );
    Ok(chart)
}

/// Dataset a chart falls back to when no fixture is configured.
///
/// Only the donut has one: its inline `values`, as `key,value` records.
pub fn inline_dataset(config: &ChartConfig) -> Option<Dataset> {
    match &config.options {
        ChartOptions::Donut(opts) => {
            let records = opts
                .values
                .iter()
                .map(|(k, v)| {
                    Record::new()
                        .with(&opts.key_column, k.as_str())
                        .with(&opts.value_column, *v)
                })
                .collect();
            Some(Dataset::new(
                vec![opts.key_column.clone(), opts.value_column.clone()],
                records,
            ))
        }
        _ => None,
    }
}

/// `<svg>` root shared by the charts: `viewBox`, aspect ratio and the responsive class.
pub(crate) fn svg_root(view_box: (f64, f64, f64, f64), frame: &Frame, styled: bool) -> Scene {
    let scene = Scene::new(view_box).attr("preserveAspectRatio", "xMinYMin meet");
    let scene = if styled {
        scene.attr(
            "style",
            format!("padding: {}px; margin: {}px", frame.padding, frame.margin),
        )
    } else {
        scene
    };
    scene.attr("class", "svg-content")
}

/// `-adj -adj (w + 3adj) (h + 3adj)`: room for axes on every side.
pub(crate) fn padded_view_box(frame: &Frame) -> (f64, f64, f64, f64) {
    (
        -frame.adj,
        -frame.adj,
        frame.width + frame.adj * 3.0,
        frame.height + frame.adj * 3.0,
    )
}

/// First of `candidates` present in the dataset.
pub(crate) fn pick_column(
    kind: ChartKind,
    dataset: &Dataset,
    candidates: &[&str],
) -> Result<String, ChartError> {
    candidates
        .iter()
        .find(|c| dataset.has_column(c))
        .map(|c| c.to_string())
        .ok_or_else(|| ChartError::MissingColumn {
            kind,
            column: candidates.join(" | "),
            available: dataset.columns.clone(),
        })
}
