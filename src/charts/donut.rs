//! Donut chart with leader lines and side labels.
//!
//! Slices keep input order. Each label hangs off a polyline running from the slice
//! centroid to an elbow on a larger, undrawn arc and then horizontally to the left or
//! right edge, depending on which half of the circle the slice's mid-angle falls in.

use super::{ChartError, ChartScene, padded_view_box, svg_root};
use crate::config::{ChartKind, DonutOptions, Frame};
use crate::interaction::Behavior;
use crate::models::Dataset;
use crate::palette::SCHEME_DARK2;
use crate::scale::OrdinalScale;
use crate::scene::{Node, Transform};
use crate::shape::{Arc, pie};

pub fn render(data: &Dataset, frame: &Frame, opts: &DonutOptions) -> Result<ChartScene, ChartError> {
    let kind = ChartKind::Donut;
    // Prefer the configured columns; fall back to the first two.
    let (key_col, value_col) = if data.has_column(&opts.key_column) && data.has_column(&opts.value_column) {
        (opts.key_column.clone(), opts.value_column.clone())
    } else {
        match data.columns.as_slice() {
            [k, v, ..] => (k.clone(), v.clone()),
            _ => {
                return Err(ChartError::MissingColumn {
                    kind,
                    column: format!("{} | {}", opts.key_column, opts.value_column),
                    available: data.columns.clone(),
                });
            }
        }
    };

    let radius = frame.width.min(frame.height) / 2.0 - frame.margin;
    let arc = Arc::new(radius * opts.inner_ratio, radius * opts.outer_ratio);
    let outer_arc = Arc::new(radius * opts.label_ratio, radius * opts.label_ratio);

    let keys: Vec<String> = data.records.iter().map(|r| r.text(&key_col)).collect();
    let values: Vec<f64> = data.records.iter().map(|r| r.number(&value_col)).collect();
    let slices = pie(&values);
    let mut color = OrdinalScale::new(keys.iter().cloned(), &SCHEME_DARK2);
    if values.iter().all(|v| !(*v > 0.0)) {
        log::warn!("donut chart: no positive values, every slice is empty");
    }

    let mut paths = Node::group("slices");
    let mut leaders = Node::group("leaders");
    let mut labels = Node::group("labels");
    for (slice, key) in slices.iter().zip(&keys) {
        let i = slice.index;
        let (a0, a1) = (slice.start_angle, slice.end_angle);
        let side = if slice.label_on_right() { 1.0 } else { -1.0 };

        paths = paths.child(
            Node::path(format!("slice-{i}"), arc.path(a0, a1))
                .attr("fill", color.apply(key))
                .attr("stroke", "white")
                .attr("stroke-width", "2px")
                .attr("opacity", "0.7"),
        );

        let pos_a = arc.centroid(a0, a1);
        let pos_b = outer_arc.centroid(a0, a1);
        let pos_c = (radius * 0.95 * side, pos_b.1);
        leaders = leaders.child(
            Node::polyline(format!("leader-{i}"), vec![pos_a, pos_b, pos_c])
                .attr("stroke", "black")
                .attr("fill", "none")
                .attr("stroke-width", "1"),
        );

        let anchor = if slice.label_on_right() { "start" } else { "end" };
        labels = labels.child(
            Node::text(format!("label-{i}"), 0.0, 0.0, key.clone())
                .transform(Transform::translate(radius * 0.99 * side, pos_b.1))
                .attr("text-anchor", anchor),
        );
    }

    let mut scene = svg_root(padded_view_box(frame), frame, false);
    scene.push(
        Node::group("donut")
            .transform(Transform::translate(frame.width / 2.0, frame.height / 2.0))
            .child(paths)
            .child(leaders)
            .child(labels),
    );
    log::debug!("donut chart: {} slices, radius {radius}", slices.len());

    Ok(ChartScene {
        kind,
        scene,
        behavior: Behavior::Static,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::inline_dataset;
    use crate::config::ChartConfig;
    use crate::scene::Geometry;

    fn stock() -> ChartScene {
        let cfg = ChartConfig::for_kind(ChartKind::Donut);
        let data = inline_dataset(&cfg).unwrap();
        render(&data, &cfg.frame, &DonutOptions::default()).unwrap()
    }

    #[test]
    fn stock_donut_geometry() {
        let chart = stock();
        assert_eq!(chart.scene.view_box, (-20.0, -20.0, 510.0, 510.0));
        let group = chart.scene.find("donut").unwrap();
        assert_eq!(group.transform.unwrap().to_string(), "translate(225,225)");
        for part in ["slice", "leader", "label"] {
            let n = chart
                .scene
                .nodes()
                .iter()
                .filter(|n| n.id.starts_with(&format!("{part}-")))
                .count();
            assert_eq!(n, 8, "{part}");
        }
    }

    #[test]
    fn labels_switch_sides_at_half_turn() {
        let chart = stock();
        // a..c cover 59 of 103, so `c` ends past half; `a` is on the right, `h` on the left
        let a = chart.scene.find("label-0").unwrap();
        assert_eq!(a.get_attr("text-anchor"), Some("start"));
        assert!(a.transform.unwrap().translate.0 > 0.0);
        let h = chart.scene.find("label-7").unwrap();
        assert_eq!(h.get_attr("text-anchor"), Some("end"));
        assert!((h.transform.unwrap().translate.0 + 185.0 * 0.99).abs() < 1e-9);
    }

    #[test]
    fn leader_ends_at_fixed_x() {
        let chart = stock();
        let Geometry::Polyline(points) = &chart.scene.find("leader-0").unwrap().geometry else {
            panic!("leader should be a polyline");
        };
        assert_eq!(points.len(), 3);
        assert!((points[2].0 - 185.0 * 0.95).abs() < 1e-9);
        assert_eq!(points[1].1, points[2].1);
    }

    #[test]
    fn colours_follow_dark2_in_key_order() {
        let chart = stock();
        assert_eq!(chart.scene.find("slice-0").unwrap().get_attr("fill"), Some("#1b9e77"));
        assert_eq!(chart.scene.find("slice-1").unwrap().get_attr("fill"), Some("#d95f02"));
    }
}
