//! Colour constants used by the charts and colour parsing for raster export.

/// 8-bit RGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// ColorBrewer "Dark2" (8 colours), the donut's categorical scheme.
pub const SCHEME_DARK2: [&str; 8] = [
    "#1b9e77", "#d95f02", "#7570b3", "#e7298a", "#66a61e", "#e6ab02", "#a6761d", "#666666",
];

/// Subgroup colours of the stacked bar chart.
pub const STACKED_BAR_COLORS: [&str; 3] = ["#C7EFCF", "#FE5F55", "#EEF5DB"];

pub const BAR_FILL: &str = "#69b3a2";
pub const CONFIDENCE_FILL: &str = "#cce5df";
pub const LINE_STROKE: &str = "steelblue";
pub const HOVER_FILL: &str = "#ed3700";

/// Parse a CSS colour as used in the scenes: `#rgb`, `#rrggbb`, or a handful of names.
/// Returns `None` for `none`, `transparent` and anything unrecognised.
pub fn parse_color(s: &str) -> Option<Rgb8> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    let named = match s.to_ascii_lowercase().as_str() {
        "black" => Rgb8::new(0, 0, 0),
        "white" => Rgb8::new(255, 255, 255),
        "grey" | "gray" => Rgb8::new(128, 128, 128),
        "steelblue" => Rgb8::new(70, 130, 180),
        "red" => Rgb8::new(255, 0, 0),
        "currentcolor" => Rgb8::new(0, 0, 0),
        _ => return None,
    };
    Some(named)
}

fn parse_hex(hex: &str) -> Option<Rgb8> {
    let digit = |c: char| c.to_digit(16).map(|d| d as u8);
    let chars: Vec<char> = hex.chars().collect();
    match chars.len() {
        3 => {
            let r = digit(chars[0])?;
            let g = digit(chars[1])?;
            let b = digit(chars[2])?;
            Some(Rgb8::new(r * 17, g * 17, b * 17))
        }
        6 => {
            let byte = |i: usize| Some(digit(chars[i])? * 16 + digit(chars[i + 1])?);
            Some(Rgb8::new(byte(0)?, byte(2)?, byte(4)?))
        }
        _ => None,
    }
}
