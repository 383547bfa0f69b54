//! Writing a rendered chart to disk, by file extension.

use crate::charts::ChartScene;
use crate::raster::render_png;
use anyhow::{Context, Result, bail};
use std::path::Path;

/// Bitmap size for a scene: its `viewBox` at one pixel per user unit.
pub fn natural_size(chart: &ChartScene) -> (u32, u32) {
    let (_, _, w, h) = chart.scene.view_box;
    let px = |v: f64| if v.is_finite() && v >= 1.0 { v.round() as u32 } else { 1 };
    (px(w), px(h))
}

/// Save as `.svg` or `.png` depending on `out_path`'s extension.
pub fn save_chart<P: AsRef<Path>>(chart: &ChartScene, out_path: P) -> Result<()> {
    let out_path = out_path.as_ref();
    if let Some(dir) = out_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output directory {}", dir.display()))?;
    }
    let ext = out_path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("svg") => std::fs::write(out_path, chart.to_svg())
            .with_context(|| format!("write {}", out_path.display()))?,
        Some("png") => {
            let (w, h) = natural_size(chart);
            render_png(chart, out_path, w, h)?;
        }
        other => bail!(
            "unsupported output format {:?} for {} (expected .svg or .png)",
            other.unwrap_or(""),
            out_path.display()
        ),
    }
    log::info!("wrote {:?} chart to {}", chart.kind, out_path.display());
    Ok(())
}
