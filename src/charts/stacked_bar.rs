//! Stacked bar chart: one column per group, one segment per subgroup.

use super::{ChartError, ChartScene, padded_view_box, pick_column, svg_root};
use crate::axis::{Axis, Orient};
use crate::config::{ChartKind, Frame, StackedBarOptions};
use crate::interaction::{Behavior, SegmentInfo};
use crate::models::Dataset;
use crate::scale::{BandScale, LinearScale, OrdinalScale};
use crate::scene::{Node, Transform};
use crate::shape::stack;
use indexmap::IndexMap;

pub fn render(
    data: &Dataset,
    frame: &Frame,
    opts: &StackedBarOptions,
) -> Result<ChartScene, ChartError> {
    let kind = ChartKind::StackedBar;
    let group_col = match &opts.group_column {
        Some(c) => pick_column(kind, data, &[c.as_str()])?,
        None if data.has_column("group") => "group".to_string(),
        None => data.columns.first().cloned().ok_or_else(|| ChartError::EmptyDataset {
            kind,
            reason: "fixture has no columns".into(),
        })?,
    };
    let subgroups: Vec<String> = data
        .columns
        .iter()
        .filter(|c| **c != group_col)
        .cloned()
        .collect();
    let (w, h) = (frame.width, frame.height);

    let x = BandScale::new(data.records.iter().map(|r| r.text(&group_col)), (0.0, w))
        .padding(opts.band_padding);
    let y = LinearScale::new((0.0, opts.y_max), (h, 0.0));
    let palette: Vec<&str> = opts.colors.iter().map(String::as_str).collect();
    let mut color = OrdinalScale::new(subgroups.iter().cloned(), &palette);

    let mut scene = svg_root(padded_view_box(frame), frame, true);
    scene.push(
        Axis::band(Orient::Bottom, &x, (0.0, w))
            .tick_size_outer(0.0)
            .build("x-axis")
            .transform(Transform::translate(0.0, h)),
    );
    scene.push(Axis::linear(Orient::Left, &y, 10).build("y-axis"));

    let layers = stack(&subgroups, &data.records, |r, k| r.number(k));
    let mut segments = IndexMap::new();
    let mut bars = Node::group("layers");
    for layer in &layers {
        let mut g = Node::group(format!("layer-{}", layer.index))
            .attr("class", "layer")
            .attr("fill", color.apply(&layer.key));
        for (i, (record, &(y0, y1))) in data.records.iter().zip(&layer.spans).enumerate() {
            let id = format!("seg-{}-{i}", layer.index);
            let bx = x.apply(&record.text(&group_col)).unwrap_or(f64::NAN);
            let top = y.apply(y1);
            g = g.child(
                Node::rect(id.clone(), bx, top, x.bandwidth(), y.apply(y0) - top)
                    .attr("stroke", "grey"),
            );
            segments.insert(
                id,
                SegmentInfo {
                    subgroup: layer.key.clone(),
                    value: record.text(&layer.key),
                },
            );
        }
        bars = bars.child(g);
    }
    scene.push(bars);
    log::debug!(
        "stacked bar chart: {} groups x {} subgroups",
        x.domain().len(),
        subgroups.len()
    );

    Ok(ChartScene {
        kind,
        scene,
        behavior: Behavior::StackedBar {
            tooltip_offset: opts.tooltip_offset,
            segments,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use crate::scene::Geometry;

    fn fixture() -> Dataset {
        let rows = [
            ("banana", "12", "1", "13"),
            ("poacee", "6", "6", "33"),
            ("sorgho", "11", "28", "12"),
        ];
        Dataset::from_records(
            rows.iter()
                .map(|(g, a, b, c)| {
                    Record::new()
                        .with("group", *g)
                        .with("Nitrogen", *a)
                        .with("normal", *b)
                        .with("stress", *c)
                })
                .collect(),
        )
    }

    fn height(chart: &ChartScene, id: &str) -> f64 {
        match chart.scene.find(id).map(|n| &n.geometry) {
            Some(Geometry::Rect { height, .. }) => *height,
            other => panic!("{id}: {other:?}"),
        }
    }

    #[test]
    fn segment_heights_sum_to_group_total() {
        let chart = render(&fixture(), &Frame::default(), &StackedBarOptions::default()).unwrap();
        // poacee: 6 + 6 + 33 = 45 of 60 over 500px
        let total: f64 = (0..3).map(|k| height(&chart, &format!("seg-{k}-1"))).sum();
        assert!((total - 45.0 / 60.0 * 500.0).abs() < 1e-9);
    }

    #[test]
    fn layers_take_colours_in_subgroup_order() {
        let chart = render(&fixture(), &Frame::default(), &StackedBarOptions::default()).unwrap();
        let fills: Vec<_> = chart
            .scene
            .with_class("layer")
            .iter()
            .map(|n| n.get_attr("fill").unwrap_or_default().to_string())
            .collect();
        assert_eq!(fills, vec!["#C7EFCF", "#FE5F55", "#EEF5DB"]);
        assert_eq!(chart.scene.find("seg-0-0").unwrap().get_attr("stroke"), Some("grey"));
    }

    #[test]
    fn every_segment_has_a_tooltip() {
        let chart = render(&fixture(), &Frame::default(), &StackedBarOptions::default()).unwrap();
        let Behavior::StackedBar { segments, .. } = &chart.behavior else {
            panic!("expected stacked bar behavior");
        };
        assert_eq!(segments.len(), 9);
        assert_eq!(segments["seg-2-2"].subgroup, "stress");
        assert_eq!(segments["seg-2-2"].value, "12");
    }

    #[test]
    fn first_column_groups_json_records() {
        let data = Dataset::from_records(vec![
            Record::new()
                .with("conference_name", "RustConf")
                .with("tickets_sold", 30.0)
                .with("tickets_available", 10.0),
        ]);
        let chart = render(&data, &Frame::default(), &StackedBarOptions::default()).unwrap();
        assert!(chart.scene.find("seg-1-0").is_some());
        assert!(chart.scene.find("seg-2-0").is_none());
    }
}
