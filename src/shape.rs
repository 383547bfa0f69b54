//! Shape generators: pie / arc layout, stacking, line and area paths.

use crate::scene::{PathData, polar};
use std::f64::consts::{PI, TAU};

/// Angular extent of one pie slice (radians, 0 at 12 o'clock, clockwise).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slice {
    pub index: usize,
    pub value: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl Slice {
    pub fn mid_angle(&self) -> f64 {
        self.start_angle + (self.end_angle - self.start_angle) / 2.0
    }

    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Whether the label sits in the right hemisphere.
    pub fn label_on_right(&self) -> bool {
        self.mid_angle() < PI
    }
}

/// Partition a full turn proportionally to `values`, keeping input order.
///
/// Non-positive and `NaN` values get zero-width slices. The last non-empty slice ends
/// exactly at `2π`, so slice spans sum to a full turn whenever the total is positive.
/// A zero total yields only empty slices.
pub fn pie(values: &[f64]) -> Vec<Slice> {
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    let k = if total > 0.0 { TAU / total } else { 0.0 };
    let last_positive = values.iter().rposition(|v| *v > 0.0);
    let mut a0 = 0.0;
    values
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            let mut a1 = a0 + if value > 0.0 { value * k } else { 0.0 };
            if Some(index) == last_positive {
                a1 = TAU;
            }
            let s = Slice {
                index,
                value,
                start_angle: a0,
                end_angle: a1,
            };
            a0 = a1;
            s
        })
        .collect()
}

/// Annular sector generator centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl Arc {
    pub fn new(inner_radius: f64, outer_radius: f64) -> Self {
        Self {
            inner_radius,
            outer_radius,
        }
    }

    /// Outline of the sector between `a0` and `a1`.
    pub fn path(&self, a0: f64, a1: f64) -> PathData {
        let mut d = PathData::new();
        let origin = (0.0, 0.0);
        let (r0, r1) = (self.inner_radius, self.outer_radius);
        let full = (a1 - a0).abs() >= TAU - 1e-9;
        let (sx, sy) = polar(origin, r1, a0);
        d.move_to(sx, sy);
        d.arc(origin, r1, a0, a1);
        if r0 > 0.0 {
            if full {
                // Ring: separate inner subpath so the hole is cut out.
                let (ix, iy) = polar(origin, r0, a1);
                d.move_to(ix, iy);
            } else {
                let (ix, iy) = polar(origin, r0, a1);
                d.line_to(ix, iy);
            }
            d.arc(origin, r0, a1, a0);
        } else if !full {
            d.line_to(0.0, 0.0);
        }
        d.close();
        d
    }

    /// Midpoint of the sector: middle radius at the middle angle.
    pub fn centroid(&self, a0: f64, a1: f64) -> (f64, f64) {
        let r = (self.inner_radius + self.outer_radius) / 2.0;
        let a = (a0 + a1) / 2.0 - PI / 2.0;
        (a.cos() * r, a.sin() * r)
    }
}

/// One layer of a stacked layout: `[y0, y1]` for each input record.
#[derive(Debug, Clone, PartialEq)]
pub struct StackLayer {
    pub key: String,
    pub index: usize,
    pub spans: Vec<(f64, f64)>,
}

/// Stack `rows[i][k]` values per record in key order, starting from zero.
///
/// `value(record, key)` supplies the number. A `NaN` value gives a `(y0, NaN)` span and
/// the next layer starts again from that span's base, so only the bad cell degenerates.
pub fn stack<R>(keys: &[String], rows: &[R], value: impl Fn(&R, &str) -> f64) -> Vec<StackLayer> {
    let mut base = vec![0.0f64; rows.len()];
    keys.iter()
        .enumerate()
        .map(|(index, key)| {
            let spans = rows
                .iter()
                .zip(base.iter_mut())
                .map(|(row, b)| {
                    let y0 = *b;
                    let y1 = y0 + value(row, key);
                    *b = if y1.is_nan() { y0 } else { y1 };
                    (y0, y1)
                })
                .collect();
            StackLayer {
                key: key.clone(),
                index,
                spans,
            }
        })
        .collect()
}

/// `M x,y L x,y …` through `points` in order. Empty input gives an empty path.
pub fn line_path(points: &[(f64, f64)]) -> PathData {
    let mut d = PathData::new();
    for (i, &(x, y)) in points.iter().enumerate() {
        if i == 0 {
            d.move_to(x, y);
        } else {
            d.line_to(x, y);
        }
    }
    d
}

/// Closed band: forward along the top line `(x, y1)`, back along the base line `(x, y0)`.
pub fn area_path(points: &[(f64, f64, f64)]) -> PathData {
    let mut d = PathData::new();
    if points.is_empty() {
        return d;
    }
    for (i, &(x, _, y1)) in points.iter().enumerate() {
        if i == 0 {
            d.move_to(x, y1);
        } else {
            d.line_to(x, y1);
        }
    }
    for &(x, y0, _) in points.iter().rev() {
        d.line_to(x, y0);
    }
    d.close();
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::PathCmd;

    #[test]
    fn pie_spans_full_turn_in_input_order() {
        let slices = pie(&[9.0, 20.0, 30.0, 8.0, 12.0, 3.0, 7.0, 14.0]);
        assert_eq!(slices.len(), 8);
        assert_eq!(slices[0].start_angle, 0.0);
        assert_eq!(slices.last().unwrap().end_angle, TAU);
        let sum: f64 = slices.iter().map(Slice::span).sum();
        assert!((sum - TAU).abs() < 1e-12);
        // c (30) is larger than b (20) but still comes after it
        assert!(slices[2].start_angle > slices[1].start_angle);
    }

    #[test]
    fn pie_ignores_non_positive_values() {
        let slices = pie(&[0.0, -3.0, 5.0, f64::NAN]);
        assert_eq!(slices[0].span(), 0.0);
        assert_eq!(slices[1].span(), 0.0);
        assert_eq!(slices[2].span(), TAU);
        assert_eq!(slices[3].span(), 0.0);
    }

    #[test]
    fn pie_of_zero_total_is_empty_slices() {
        assert!(pie(&[0.0, 0.0]).iter().all(|s| s.span() == 0.0));
    }

    #[test]
    fn centroid_of_right_half() {
        let arc = Arc::new(10.0, 30.0);
        let (x, y) = arc.centroid(0.0, PI);
        assert!((x - 20.0).abs() < 1e-9);
        assert!(y.abs() < 1e-9);
    }

    #[test]
    fn donut_path_returns_along_inner_radius() {
        let d = Arc::new(50.0, 80.0).path(0.0, PI / 2.0);
        let arcs: Vec<_> = d
            .0
            .iter()
            .filter_map(|c| match c {
                PathCmd::Arc { radius, a0, a1, .. } => Some((*radius, *a0, *a1)),
                _ => None,
            })
            .collect();
        assert_eq!(arcs, vec![(80.0, 0.0, PI / 2.0), (50.0, PI / 2.0, 0.0)]);
    }

    #[test]
    fn stack_accumulates_per_record() {
        let keys = vec!["a".to_string(), "b".to_string()];
        let rows = vec![(1.0, 2.0), (3.0, 4.0)];
        let layers = stack(&keys, &rows, |r, k| if k == "a" { r.0 } else { r.1 });
        assert_eq!(layers[0].spans, vec![(0.0, 1.0), (0.0, 3.0)]);
        assert_eq!(layers[1].spans, vec![(1.0, 3.0), (3.0, 7.0)]);
    }

    #[test]
    fn stack_skips_nan_layer() {
        let keys: Vec<String> = ["a", "b", "c"].iter().map(|k| k.to_string()).collect();
        let rows = vec![(1.0, f64::NAN, 3.0)];
        let layers = stack(&keys, &rows, |r, k| match k {
            "a" => r.0,
            "b" => r.1,
            _ => r.2,
        });
        assert_eq!(layers[0].spans, vec![(0.0, 1.0)]);
        assert_eq!(layers[1].spans[0].0, 1.0);
        assert!(layers[1].spans[0].1.is_nan());
        assert_eq!(layers[2].spans, vec![(1.0, 4.0)]);
    }

    #[test]
    fn area_goes_forward_then_back() {
        let d = area_path(&[(0.0, 10.0, 5.0), (1.0, 11.0, 6.0)]);
        assert_eq!(d.to_string(), "M0,5L1,6L1,11L0,10Z");
    }

    #[test]
    fn line_keeps_input_order() {
        let d = line_path(&[(2.0, 0.0), (1.0, 1.0)]);
        assert_eq!(d.vertices(), vec![(2.0, 0.0), (1.0, 1.0)]);
    }
}
