//! PNG export: draw a [`Scene`] onto a plotters bitmap.
//!
//! The scene's `viewBox` is fitted into the bitmap like `preserveAspectRatio="xMinYMin
//! meet"`. Arcs are flattened to polygons. `ab_glyph` does not discover system fonts, so
//! text is only drawn once a font has been registered (see [`register_font_file`]);
//! otherwise text nodes are skipped with a warning.

use crate::charts::ChartScene;
use crate::palette::parse_color;
use crate::scene::{Geometry, Node, Scene, Transform};
use anyhow::{Context, Result, anyhow};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};
use plotters_bitmap::BitMapBackend;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

static FONT_READY: AtomicBool = AtomicBool::new(false);
static INIT_FONTS: Once = Once::new();

/// Environment variable naming a TTF/OTF file to use for text.
pub const FONT_ENV: &str = "CHARTDECK_FONT";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Register `path` as the `sans-serif` font used for all raster text.
pub fn register_font_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).with_context(|| format!("read font {}", path.display()))?;
    // plotters keeps a 'static reference for the life of the process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    plotters::style::register_font("sans-serif", FontStyle::Normal, bytes)
        .map_err(|_| anyhow!("{} is not a usable font", path.display()))?;
    FONT_READY.store(true, Ordering::SeqCst);
    log::debug!("registered raster font {}", path.display());
    Ok(())
}

/// Try `$CHARTDECK_FONT`, then a few well-known system locations. Runs once.
fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        if FONT_READY.load(Ordering::SeqCst) {
            return;
        }
        let from_env = std::env::var_os(FONT_ENV).map(std::path::PathBuf::from);
        let candidates = from_env
            .into_iter()
            .chain(SYSTEM_FONTS.iter().map(std::path::PathBuf::from));
        for p in candidates {
            if p.is_file() && register_font_file(&p).is_ok() {
                return;
            }
        }
    });
}

pub fn fonts_available() -> bool {
    FONT_READY.load(Ordering::SeqCst)
}

/// Write `chart` as a `width` x `height` PNG.
pub fn render_png<P: AsRef<Path>>(chart: &ChartScene, out_path: P, width: u32, height: u32) -> Result<()> {
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    let skipped = draw_scene(&root, &chart.scene)?;
    if skipped > 0 {
        log::warn!(
            "{skipped} text nodes skipped in {}: no font registered (set {FONT_ENV})",
            out_path.display()
        );
    }
    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// 2-D affine map `x' = a x + c y + e`, `y' = b x + d y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Affine {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Affine {
    fn viewport(view_box: (f64, f64, f64, f64), size: (u32, u32)) -> Self {
        let (vx, vy, vw, vh) = view_box;
        let s = if vw > 0.0 && vh > 0.0 {
            (size.0 as f64 / vw).min(size.1 as f64 / vh)
        } else {
            1.0
        };
        Self {
            a: s,
            b: 0.0,
            c: 0.0,
            d: s,
            e: -vx * s,
            f: -vy * s,
        }
    }

    fn then(self, t: &Transform) -> Self {
        let (tx, ty) = t.translate;
        let moved = Self {
            e: self.a * tx + self.c * ty + self.e,
            f: self.b * tx + self.d * ty + self.f,
            ..self
        };
        if t.rotate == 0.0 {
            return moved;
        }
        let (sin, cos) = t.rotate.to_radians().sin_cos();
        Self {
            a: moved.a * cos + moved.c * sin,
            b: moved.b * cos + moved.d * sin,
            c: -moved.a * sin + moved.c * cos,
            d: -moved.b * sin + moved.d * cos,
            ..moved
        }
    }

    fn apply(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
    }

    fn scale(&self) -> f64 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }

    /// Clockwise rotation in degrees.
    fn rotation(&self) -> f64 {
        self.b.atan2(self.a).to_degrees()
    }
}

/// Presentation state inherited down the tree.
#[derive(Debug, Clone)]
struct Paint {
    fill: Option<String>,
    stroke: Option<String>,
    stroke_width: f64,
    opacity: f64,
    font_size: f64,
    anchor: String,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            fill: Some("black".into()),
            stroke: None,
            stroke_width: 1.0,
            opacity: 1.0,
            font_size: 16.0,
            anchor: "start".into(),
        }
    }
}

impl Paint {
    fn inherit(&self, node: &Node) -> Self {
        let mut p = self.clone();
        if let Some(v) = node.get_attr("fill") {
            p.fill = paint_value(v);
        }
        if let Some(v) = node.get_attr("stroke") {
            p.stroke = paint_value(v);
        }
        if let Some(v) = node.get_attr("stroke-width").and_then(parse_length) {
            p.stroke_width = v;
        }
        if let Some(v) = node.get_attr("opacity").and_then(|v| v.trim().parse::<f64>().ok()) {
            p.opacity *= v.clamp(0.0, 1.0);
        }
        if let Some(v) = node.get_attr("font-size").and_then(parse_length) {
            p.font_size = v;
        }
        if let Some(v) = node.get_attr("text-anchor") {
            p.anchor = v.to_string();
        }
        p
    }

    fn color(&self, value: &Option<String>) -> Option<RGBAColor> {
        let rgb = parse_color(value.as_deref()?)?;
        Some(RGBColor(rgb.r, rgb.g, rgb.b).mix(self.opacity))
    }

    fn fill_style(&self) -> Option<ShapeStyle> {
        self.color(&self.fill).map(|c| c.filled())
    }

    fn stroke_style(&self, scale: f64) -> Option<ShapeStyle> {
        let width = (self.stroke_width * scale).round().max(1.0) as u32;
        self.color(&self.stroke).map(|c| c.stroke_width(width))
    }
}

fn paint_value(v: &str) -> Option<String> {
    match v.trim() {
        "none" => None,
        other => Some(other.to_string()),
    }
}

/// `2px`, `1.5`, `10` → number of user units.
fn parse_length(v: &str) -> Option<f64> {
    v.trim().trim_end_matches("px").parse().ok()
}

/// `0.71em` / `.75em` relative to `font_size`.
fn parse_em(v: Option<&str>, font_size: f64) -> f64 {
    v.and_then(|v| v.trim().strip_suffix("em"))
        .and_then(|v| v.parse::<f64>().ok())
        .map_or(0.0, |em| em * font_size)
}

fn pixel((x, y): (f64, f64)) -> Option<(i32, i32)> {
    (x.is_finite() && y.is_finite()).then(|| (x.round() as i32, y.round() as i32))
}

fn pixels(points: &[(f64, f64)], m: &Affine) -> Option<Vec<(i32, i32)>> {
    points.iter().map(|p| pixel(m.apply(*p))).collect()
}

/// Draw every node of `scene`; returns how many text nodes were skipped for lack of a font.
pub fn draw_scene<DB>(root: &DrawingArea<DB, Shift>, scene: &Scene) -> Result<usize>
where
    DB: DrawingBackend,
{
    let m = Affine::viewport(scene.view_box, root.dim_in_pixel());
    let mut skipped = 0;
    let paint = Paint::default();
    for node in &scene.children {
        draw_node(root, node, &m, &paint, &mut skipped)?;
    }
    Ok(skipped)
}

fn draw_node<DB>(
    root: &DrawingArea<DB, Shift>,
    node: &Node,
    parent: &Affine,
    inherited: &Paint,
    skipped: &mut usize,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let paint = inherited.inherit(node);
    if paint.opacity <= 0.0 {
        return Ok(());
    }
    let m = match &node.transform {
        Some(t) => parent.then(t),
        None => *parent,
    };
    let scale = m.scale();

    match &node.geometry {
        Geometry::Group => {}
        Geometry::Rect {
            x,
            y,
            width,
            height,
        } => {
            let corners = [(*x, *y), (x + width, *y), (x + width, y + height), (*x, y + height)];
            if let Some(pts) = pixels(&corners, &m) {
                if let Some(style) = paint.fill_style() {
                    root.draw(&Polygon::new(pts.clone(), style))
                        .map_err(|e| anyhow!("{:?}", e))?;
                }
                if let Some(style) = paint.stroke_style(scale) {
                    let mut ring = pts;
                    ring.push(ring[0]);
                    root.draw(&PathElement::new(ring, style))
                        .map_err(|e| anyhow!("{:?}", e))?;
                }
            }
        }
        Geometry::Circle { cx, cy, r } => {
            if let Some(center) = pixel(m.apply((*cx, *cy))) {
                let radius = (r * scale).round().max(0.0) as i32;
                if let Some(style) = paint.fill_style() {
                    root.draw(&Circle::new(center, radius, style))
                        .map_err(|e| anyhow!("{:?}", e))?;
                }
                if let Some(style) = paint.stroke_style(scale) {
                    root.draw(&Circle::new(center, radius, style))
                        .map_err(|e| anyhow!("{:?}", e))?;
                }
            }
        }
        Geometry::Path(d) => {
            for poly in d.flatten(0.05) {
                let Some(pts) = pixels(&poly, &m) else {
                    continue;
                };
                if pts.len() < 2 {
                    continue;
                }
                if pts.len() > 2 {
                    if let Some(style) = paint.fill_style() {
                        root.draw(&Polygon::new(pts.clone(), style))
                            .map_err(|e| anyhow!("{:?}", e))?;
                    }
                }
                if let Some(style) = paint.stroke_style(scale) {
                    root.draw(&PathElement::new(pts, style))
                        .map_err(|e| anyhow!("{:?}", e))?;
                }
            }
        }
        Geometry::Polyline(points) => {
            if let (Some(pts), Some(style)) = (pixels(points, &m), paint.stroke_style(scale)) {
                root.draw(&PathElement::new(pts, style))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
        Geometry::Line { x1, y1, x2, y2 } => {
            let ends = [(*x1, *y1), (*x2, *y2)];
            if let (Some(pts), Some(style)) = (pixels(&ends, &m), paint.stroke_style(scale)) {
                root.draw(&PathElement::new(pts, style))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
        Geometry::Text { x, y, content } => {
            if !content.is_empty() {
                draw_text(root, node, &paint, &m, (*x, *y), content, skipped)?;
            }
        }
    }

    for child in &node.children {
        draw_node(root, child, &m, &paint, skipped)?;
    }
    Ok(())
}

fn draw_text<DB>(
    root: &DrawingArea<DB, Shift>,
    node: &Node,
    paint: &Paint,
    m: &Affine,
    (x, y): (f64, f64),
    content: &str,
    skipped: &mut usize,
) -> Result<()>
where
    DB: DrawingBackend,
{
    if !fonts_available() {
        *skipped += 1;
        return Ok(());
    }
    let Some(color) = paint.color(&paint.fill) else {
        return Ok(());
    };
    let dy = parse_em(node.get_attr("dy"), paint.font_size);
    let Some(at) = pixel(m.apply((x, y + dy))) else {
        return Ok(());
    };
    let h = match paint.anchor.as_str() {
        "middle" => HPos::Center,
        "end" => HPos::Right,
        _ => HPos::Left,
    };
    let v = match node.get_attr("alignment-baseline") {
        Some("middle") => VPos::Center,
        _ => VPos::Bottom,
    };
    let size = (paint.font_size * m.scale()).max(1.0);
    let mut font = FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal);
    // Only quarter turns are supported by the bitmap text path.
    let rotation = m.rotation().round() as i32;
    if rotation == -90 || rotation == 270 {
        font = font.transform(FontTransform::Rotate270);
    }
    let style = TextStyle::from(font).color(&color).pos(Pos::new(h, v));
    root.draw(&Text::new(content.to_string(), at, style))
        .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_meets_on_the_tighter_axis() {
        let m = Affine::viewport((-30.0, -30.0, 1050.0, 590.0), (525, 590));
        assert_eq!(m.apply((-30.0, -30.0)), (0.0, 0.0));
        assert_eq!(m.apply((1020.0, -30.0)), (525.0, 0.0));
    }

    #[test]
    fn translate_then_rotate_composes_like_svg() {
        let t = Transform::translate(10.0, 0.0).rotated(90.0);
        let m = Affine::viewport((0.0, 0.0, 100.0, 100.0), (100, 100)).then(&t);
        let (x, y) = m.apply((1.0, 0.0));
        assert!((x - 10.0).abs() < 1e-9);
        assert!((y - 1.0).abs() < 1e-9);
        assert!((m.rotation() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn paint_inherits_and_multiplies_opacity() {
        let root = Paint::default();
        let g = Node::group("g").attr("fill", "none").attr("opacity", "0.5");
        let p = root.inherit(&g).inherit(&Node::group("c").attr("opacity", "0.5"));
        assert!(p.fill.is_none());
        assert_eq!(p.opacity, 0.25);
        assert_eq!(parse_length("2px"), Some(2.0));
        assert_eq!(parse_em(Some(".75em"), 10.0), 7.5);
    }
}
