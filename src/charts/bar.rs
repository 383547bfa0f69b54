//! Vertical bar chart: one rectangle per record on a band x-axis.

use super::{ChartError, ChartScene, padded_view_box, pick_column, svg_root};
use crate::axis::{Axis, Orient};
use crate::config::{BarOptions, ChartKind, Frame};
use crate::interaction::Behavior;
use crate::models::Dataset;
use crate::scale::{BandScale, LinearScale};
use crate::scene::{Node, Transform};

pub fn render(data: &Dataset, frame: &Frame, opts: &BarOptions) -> Result<ChartScene, ChartError> {
    let kind = ChartKind::Bar;
    let cat_col = match &opts.category_column {
        Some(c) => pick_column(kind, data, &[c.as_str()])?,
        None => pick_column(kind, data, &["Country", "cat"])?,
    };
    let val_col = match &opts.value_column {
        Some(c) => pick_column(kind, data, &[c.as_str()])?,
        None => pick_column(kind, data, &["Value", "val"])?,
    };
    let (w, h) = (frame.width, frame.height);

    let x = BandScale::new(data.records.iter().map(|r| r.text(&cat_col)), (0.0, w))
        .padding(opts.band_padding);
    // Fixed upper bound: larger values overflow above the plot.
    let y = LinearScale::new((0.0, opts.y_max), (h, 0.0));
    log::debug!(
        "bar chart: {} categories, bandwidth {:.2}, y domain [0, {}]",
        x.domain().len(),
        x.bandwidth(),
        opts.y_max
    );

    let mut scene = svg_root(padded_view_box(frame), frame, true);
    scene.push(
        Axis::band(Orient::Bottom, &x, (0.0, w))
            .rotate_labels(Transform::translate(-10.0, 0.0).rotated(-45.0), "end")
            .build("x-axis")
            .transform(Transform::translate(0.0, h)),
    );
    scene.push(Axis::linear(Orient::Left, &y, 10).build("y-axis"));

    let bars = data.records.iter().enumerate().map(|(i, r)| {
        let bx = x.apply(&r.text(&cat_col)).unwrap_or(f64::NAN);
        let by = y.apply(r.number(&val_col));
        Node::rect(format!("bar-{i}"), bx, by, x.bandwidth(), h - by).attr("fill", opts.fill.as_str())
    });
    scene.push(Node::group("bars").children(bars));

    Ok(ChartScene {
        kind,
        scene,
        behavior: Behavior::Static,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use crate::scene::Geometry;

    fn rect(chart: &ChartScene, id: &str) -> (f64, f64, f64, f64) {
        match chart.scene.find(id).map(|n| &n.geometry) {
            Some(Geometry::Rect {
                x,
                y,
                width,
                height,
            }) => (*x, *y, *width, *height),
            other => panic!("{id} is not a rect: {other:?}"),
        }
    }

    #[test]
    fn values_above_the_bound_overflow_the_plot() {
        let data = Dataset::from_records(vec![
            Record::new().with("Country", "A").with("Value", "5000"),
            Record::new().with("Country", "B").with("Value", "13500"),
        ]);
        let chart = render(&data, &Frame::default(), &BarOptions::default()).unwrap();
        let (_, ay, _, ah) = rect(&chart, "bar-0");
        assert!((ay + ah - 500.0).abs() < 1e-9);
        let (_, by, _, bh) = rect(&chart, "bar-1");
        assert!(by < 0.0);
        assert!(bh > 500.0);
    }

    #[test]
    fn bands_are_ordered_and_disjoint() {
        let data = Dataset::from_records(
            ["US", "RU", "FR", "DE"]
                .iter()
                .map(|c| Record::new().with("cat", *c).with("val", "10"))
                .collect(),
        );
        let chart = render(&data, &Frame::default(), &BarOptions::default()).unwrap();
        let rects: Vec<_> = (0..4).map(|i| rect(&chart, &format!("bar-{i}"))).collect();
        for pair in rects.windows(2) {
            assert!(pair[0].0 + pair[0].2 <= pair[1].0);
        }
        assert_eq!(chart.scene.with_class("axis").len(), 2);
    }

    #[test]
    fn non_numeric_values_render_as_nan() {
        let data = Dataset::from_records(vec![Record::new().with("Country", "X").with("Value", "n/a")]);
        let chart = render(&data, &Frame::default(), &BarOptions::default()).unwrap();
        assert!(rect(&chart, "bar-0").1.is_nan());
        assert!(chart.to_svg().contains(r#"y="NaN""#));
    }

    #[test]
    fn missing_columns_are_reported() {
        let data = Dataset::from_records(vec![Record::new().with("name", "X")]);
        assert!(matches!(
            render(&data, &Frame::default(), &BarOptions::default()),
            Err(ChartError::MissingColumn { .. })
        ));
    }
}
