//! Line with a shaded confidence band and a focus marker that tracks the pointer.

use super::{ChartError, ChartScene, pick_column, svg_root};
use crate::axis::{Axis, Orient};
use crate::config::{ChartKind, Frame, LineAreaOptions};
use crate::interaction::{Behavior, FocusTrack};
use crate::models::Dataset;
use crate::palette::{CONFIDENCE_FILL, LINE_STROKE};
use crate::scale::LinearScale;
use crate::scene::{Node, Transform};
use crate::shape::{area_path, line_path};

pub fn render(
    data: &Dataset,
    frame: &Frame,
    opts: &LineAreaOptions,
) -> Result<ChartScene, ChartError> {
    let kind = ChartKind::LineArea;
    let x_col = pick_column(kind, data, &[opts.x_column.as_str()])?;
    let y_col = pick_column(kind, data, &[opts.y_column.as_str()])?;
    let lo_col = pick_column(kind, data, &[opts.lower_column.as_str()])?;
    let hi_col = pick_column(kind, data, &[opts.upper_column.as_str()])?;
    let (w, h) = (frame.width, frame.height);

    let x = LinearScale::new(opts.x_domain, (0.0, w));
    let y = LinearScale::new(opts.y_domain, (h, 0.0));
    let xs: Vec<f64> = data.records.iter().map(|r| r.number(&x_col)).collect();
    let ys: Vec<f64> = data.records.iter().map(|r| r.number(&y_col)).collect();
    let labels: Vec<(String, String)> = data
        .records
        .iter()
        .map(|r| (r.text(&x_col), r.text(&y_col)))
        .collect();

    let view_box = (-frame.adj, -frame.adj, w + frame.adj, h + frame.adj * 2.0);
    let mut scene = svg_root(view_box, frame, true);
    scene.push(
        Axis::linear(Orient::Bottom, &x, 10)
            .build("x-axis")
            .transform(Transform::translate(0.0, h)),
    );
    scene.push(Axis::linear(Orient::Left, &y, 10).build("y-axis"));

    // The upper bound is the base line and the lower bound the top line.
    let band: Vec<(f64, f64, f64)> = data
        .records
        .iter()
        .zip(&xs)
        .map(|(r, &vx)| (x.apply(vx), y.apply(r.number(&hi_col)), y.apply(r.number(&lo_col))))
        .collect();
    scene.push(
        Node::path("confidence", area_path(&band))
            .attr("fill", CONFIDENCE_FILL)
            .attr("stroke", "none"),
    );

    scene.push(
        Node::group("focus-group").child(
            Node::circle("focus", 0.0, 0.0, 8.5)
                .attr("fill", "none")
                .attr("stroke", "black")
                .attr("opacity", "0"),
        ),
    );
    scene.push(
        Node::group("focus-text-group").child(
            Node::text("focus-text", 0.0, 0.0, "")
                .attr("opacity", "0")
                .attr("text-anchor", "start")
                .attr("alignment-baseline", "middle"),
        ),
    );

    let points: Vec<(f64, f64)> = xs
        .iter()
        .zip(&ys)
        .map(|(&vx, &vy)| (x.apply(vx), y.apply(vy)))
        .collect();
    scene.push(
        Node::path("line", line_path(&points))
            .attr("fill", "none")
            .attr("stroke", LINE_STROKE)
            .attr("stroke-width", "1.5"),
    );

    scene.push(
        Node::rect("overlay", 0.0, 0.0, w, h)
            .attr("fill", "none")
            .attr("pointer-events", "all"),
    );
    log::debug!("line-area chart: {} rows", data.len());

    Ok(ChartScene {
        kind,
        scene,
        behavior: Behavior::LineArea(FocusTrack {
            overlay: "overlay".into(),
            marker: "focus".into(),
            label: "focus-text".into(),
            x,
            y,
            xs,
            ys,
            labels,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::PointerEvent;
    use crate::models::Record;
    use crate::scene::Geometry;

    fn fixture() -> Dataset {
        Dataset::from_records(
            (1..=4)
                .map(|i| {
                    let v = i as f64;
                    Record::new()
                        .with("x", v)
                        .with("y", v + 2.0)
                        .with("CI_left", v + 1.0)
                        .with("CI_right", v + 3.0)
                })
                .collect(),
        )
    }

    #[test]
    fn layers_paint_in_order() {
        let chart = render(&fixture(), &Frame::for_kind(ChartKind::LineArea), &LineAreaOptions::default())
            .unwrap();
        let ids: Vec<&str> = chart.scene.children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["x-axis", "y-axis", "confidence", "focus-group", "focus-text-group", "line", "overlay"]
        );
        assert_eq!(chart.scene.view_box, (-20.0, -20.0, 980.0, 540.0));
    }

    #[test]
    fn band_uses_upper_bound_as_base() {
        let chart = render(&fixture(), &Frame::default(), &LineAreaOptions::default()).unwrap();
        let Geometry::Path(d) = &chart.scene.find("confidence").unwrap().geometry else {
            panic!("band should be a path");
        };
        let v = d.vertices();
        assert_eq!(v.len(), 8);
        let y = LinearScale::new((0.0, 13.0), (500.0, 0.0));
        // first vertex on the CI_left line, last on CI_right
        assert_eq!(v[0].1, y.apply(2.0));
        assert_eq!(v[7].1, y.apply(4.0));
    }

    #[test]
    fn hovering_moves_focus_to_row() {
        let mut chart = render(&fixture(), &Frame::default(), &LineAreaOptions::default()).unwrap();
        let mut hover = chart.hover_machine();
        hover.dispatch(&mut chart.scene, &PointerEvent::enter("overlay", 0.0, 0.0));
        // x = 1 + 20/960 * 99 ≈ 3.06 → first row with x >= 3.06 is x = 4
        hover.dispatch(&mut chart.scene, &PointerEvent::moved(20.0, 0.0));
        let Geometry::Text { content, .. } = &chart.scene.find("focus-text").unwrap().geometry else {
            panic!("focus text should be text");
        };
        assert_eq!(content, "x:4  -  y:6");
        assert_eq!(chart.scene.find("focus").unwrap().get_attr("opacity"), Some("1"));
    }

    #[test]
    fn focus_text_keeps_cells_verbatim() {
        let data = Dataset::from_records(
            ["1", "2", "3"]
                .into_iter()
                .map(|x| {
                    Record::new()
                        .with("x", x)
                        .with("y", "8.10")
                        .with("CI_left", "7.5")
                        .with("CI_right", "9.0")
                })
                .collect(),
        );
        let mut chart = render(&data, &Frame::default(), &LineAreaOptions::default()).unwrap();
        let mut hover = chart.hover_machine();
        hover.dispatch(&mut chart.scene, &PointerEvent::enter("overlay", 0.0, 0.0));
        // x ≈ 1.5 → row x = 2
        hover.dispatch(&mut chart.scene, &PointerEvent::moved(5.0, 0.0));
        let Geometry::Text { content, .. } = &chart.scene.find("focus-text").unwrap().geometry else {
            panic!("focus text should be text");
        };
        assert_eq!(content, "x:2  -  y:8.10");
    }
}
