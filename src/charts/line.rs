//! Multi-series line chart over daily dates.
//!
//! Every column after the date column is a series. Each series gets a path, an end
//! label, a small dot per row and an invisible hit circle per row that carries the
//! hover tooltip.

use super::{ChartError, ChartScene, padded_view_box, pick_column, svg_root};
use crate::axis::{Axis, Orient};
use crate::config::{ChartKind, Frame, LineOptions};
use crate::interaction::Behavior;
use crate::models::Dataset;
use crate::palette::SCHEME_DARK2;
use crate::scale::{LinearScale, TimeScale, max_finite};
use crate::scene::{Node, Transform};
use crate::shape::line_path;
use chrono::NaiveDate;
use indexmap::IndexMap;

/// One series: `(date, measurement)` per row, in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub id: String,
    pub values: Vec<(Option<NaiveDate>, f64)>,
}

/// Split a dataset into one series per value column.
pub fn series(data: &Dataset, date_col: &str) -> Vec<Series> {
    data.columns
        .iter()
        .filter(|c| c.as_str() != date_col)
        .map(|id| Series {
            id: id.clone(),
            values: data
                .records
                .iter()
                .map(|r| (r.get(date_col).as_date(), r.number(id)))
                .collect(),
        })
        .collect()
}

pub fn render(data: &Dataset, frame: &Frame, opts: &LineOptions) -> Result<ChartScene, ChartError> {
    let kind = ChartKind::Line;
    let date_col = pick_column(kind, data, &[opts.date_column.as_str()])?;
    let (w, h) = (frame.width, frame.height);
    let slices = series(data, &date_col);

    let x = TimeScale::from_extent(data.records.iter().map(|r| r.get(&date_col).as_date()), (0.0, w))
        .ok_or_else(|| ChartError::EmptyDataset {
            kind,
            reason: format!("no `{}` value matches DD-Mon-YYYY", date_col),
        })?;
    let y_max = max_finite(
        slices
            .iter()
            .flat_map(|s| s.values.iter().map(|(_, m)| m + opts.headroom)),
    )
    .unwrap_or(f64::NAN);
    let y = LinearScale::new((0.0, y_max), (h, 0.0)).rounded();
    log::debug!(
        "line chart: {} series, dates {} to {}, y max {y_max}",
        slices.len(),
        x.domain.0,
        x.domain.1
    );

    let mut scene = svg_root(padded_view_box(frame), frame, true);
    scene.push(
        Axis::days(Orient::Bottom, &x, &opts.tick_format)
            .build("x-axis")
            .transform(Transform::translate(0.0, h)),
    );
    let tick_count = slices.first().map_or(10, |s| s.values.len());
    scene.push(
        Axis::linear(Orient::Left, &y, tick_count).build("y-axis").child(
            Node::text("y-label", 0.0, 6.0, opts.y_label.clone())
                .transform(Transform::translate(0.0, 0.0).rotated(-90.0))
                .attr("dy", ".75em")
                .attr("text-anchor", "end"),
        ),
    );

    let mut targets = IndexMap::new();
    let mut lines = Node::group("lines");
    for (i, s) in slices.iter().enumerate() {
        let points: Vec<(f64, f64)> = s
            .values
            .iter()
            .map(|(d, m)| (x.apply_opt(*d), y.apply(*m)))
            .collect();
        let mut g = Node::group(format!("series-{i}")).child(
            Node::path(format!("line-{i}"), line_path(&points))
                .attr("class", format!("line-{i}"))
                .attr("fill", "none")
                .attr("stroke", SCHEME_DARK2[i % SCHEME_DARK2.len()]),
        );
        if let Some(&(lx, ly)) = points.last() {
            g = g.child(
                Node::text(format!("serie-label-{i}"), 5.0, 0.0, format!("Serie {}", s.id))
                    .attr("class", "serie_label")
                    .transform(Transform::translate(lx + 10.0, ly + 5.0)),
            );
        }
        for (j, &(px, py)) in points.iter().enumerate() {
            g = g.child(
                Node::circle(format!("point-{i}-{j}"), px, py, 1.0)
                    .attr("class", "point")
                    .attr("opacity", "1"),
            );
        }
        for (j, (&(px, py), (_, m))) in points.iter().zip(&s.values).enumerate() {
            let id = format!("hit-{i}-{j}");
            g = g.child(Node::circle(id.clone(), px, py, 10.0).attr("opacity", "0"));
            targets.insert(id, *m);
        }
        lines = lines.child(g);
    }
    scene.push(lines);

    Ok(ChartScene {
        kind,
        scene,
        behavior: Behavior::Line {
            tooltip_offset: opts.tooltip_offset,
            targets,
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
            ("01-Jan-2020", "3", "10"),
            ("02-Jan-2020", "7", "12"),
            ("03-Jan-2020", "5", "16"),
        ];
        Dataset::from_records(
            rows.iter()
                .map(|(d, a, b)| Record::new().with("date", *d).with("A", *a).with("B", *b))
                .collect(),
        )
    }

    #[test]
    fn one_point_and_hit_circle_per_row_per_series() {
        let chart = render(&fixture(), &Frame::default(), &LineOptions::default()).unwrap();
        assert_eq!(chart.scene.with_class("point").len(), 6);
        let Behavior::Line { targets, .. } = &chart.behavior else {
            panic!("expected line behavior");
        };
        assert_eq!(targets.len(), 6);
        assert_eq!(targets["hit-1-2"], 16.0);
    }

    #[test]
    fn path_follows_row_order() {
        let chart = render(&fixture(), &Frame::default(), &LineOptions::default()).unwrap();
        let Geometry::Path(d) = &chart.scene.find("line-0").unwrap().geometry else {
            panic!("line-0 should be a path");
        };
        let xs: Vec<f64> = d.vertices().iter().map(|p| p.0).collect();
        assert_eq!(xs, vec![0.0, 480.0, 960.0]);
    }

    #[test]
    fn y_domain_adds_headroom_and_rounds() {
        let chart = render(&fixture(), &Frame::default(), &LineOptions::default()).unwrap();
        // max 16 + 4 = 20 → 12 maps to 500 - 300 = 200
        let Geometry::Circle { cy, .. } = chart.scene.find("point-1-1").unwrap().geometry else {
            panic!("point should be a circle");
        };
        assert_eq!(cy, 200.0);
    }

    #[test]
    fn series_label_sits_past_last_point() {
        let chart = render(&fixture(), &Frame::default(), &LineOptions::default()).unwrap();
        let label = chart.scene.find("serie-label-1").unwrap();
        assert_eq!(label.transform.unwrap().translate, (970.0, 105.0));
        let Geometry::Text { content, .. } = &label.geometry else {
            panic!("label should be text");
        };
        assert_eq!(content, "Serie B");
    }

    #[test]
    fn one_x_tick_per_day() {
        let chart = render(&fixture(), &Frame::default(), &LineOptions::default()).unwrap();
        let x_axis = chart.scene.find("x-axis").unwrap();
        // domain path + 3 ticks
        assert_eq!(x_axis.children.len(), 4);
        let Geometry::Text { content, .. } = &chart.scene.find("x-axis-label-0").unwrap().geometry else {
            panic!("tick label should be text");
        };
        assert_eq!(content, "Jan 01");
    }

    #[test]
    fn unparseable_dates_are_an_error() {
        let data = Dataset::from_records(vec![Record::new().with("date", "2020-01-01").with("A", "1")]);
        assert!(matches!(
            render(&data, &Frame::default(), &LineOptions::default()),
            Err(ChartError::EmptyDataset { .. })
        ));
    }
}
