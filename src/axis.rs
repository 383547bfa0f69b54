//! Axis generators laid out like d3-axis: a domain path plus one group per tick.

use crate::scale::{BandScale, LinearScale, TimeScale};
use crate::scene::{Node, PathData, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orient {
    Bottom,
    Left,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub orient: Orient,
    pub range: (f64, f64),
    pub ticks: Vec<Tick>,
    pub tick_size_inner: f64,
    pub tick_size_outer: f64,
    pub tick_padding: f64,
    /// Extra transform and anchor applied to every tick label.
    pub label_transform: Option<Transform>,
    pub label_anchor: Option<&'static str>,
}

impl Axis {
    pub fn new(orient: Orient, range: (f64, f64), ticks: Vec<Tick>) -> Self {
        Self {
            orient,
            range,
            ticks,
            tick_size_inner: 6.0,
            tick_size_outer: 6.0,
            tick_padding: 3.0,
            label_transform: None,
            label_anchor: None,
        }
    }

    /// Ticks centred on each band.
    pub fn band(orient: Orient, scale: &BandScale, range: (f64, f64)) -> Self {
        let offset = scale.bandwidth() / 2.0;
        let ticks = scale
            .domain()
            .iter()
            .zip(scale.positions())
            .map(|(c, p)| Tick {
                position: p + offset,
                label: c.clone(),
            })
            .collect();
        Self::new(orient, range, ticks)
    }

    pub fn linear(orient: Orient, scale: &LinearScale, count: usize) -> Self {
        let fmt = scale.tick_format(count);
        let ticks = scale
            .ticks(count)
            .into_iter()
            .map(|v| Tick {
                position: scale.apply(v),
                label: fmt(v),
            })
            .collect();
        Self::new(orient, scale.range, ticks)
    }

    /// One tick per day, labelled with a `chrono` format string.
    pub fn days(orient: Orient, scale: &TimeScale, format: &str) -> Self {
        let ticks = scale
            .day_ticks()
            .into_iter()
            .map(|d| Tick {
                position: scale.apply(d),
                label: d.format(format).to_string(),
            })
            .collect();
        Self::new(orient, scale.range, ticks)
    }

    pub fn tick_size_outer(mut self, size: f64) -> Self {
        self.tick_size_outer = size;
        self
    }

    /// Rotate tick labels, e.g. `translate(-10,0)rotate(-45)` anchored at `end`.
    pub fn rotate_labels(mut self, transform: Transform, anchor: &'static str) -> Self {
        self.label_transform = Some(transform);
        self.label_anchor = Some(anchor);
        self
    }

    /// Build the axis group. Tick label nodes are keyed `<id>-label-<i>`.
    pub fn build(&self, id: &str) -> Node {
        let (r0, r1) = self.range;
        let outer = self.tick_size_outer;
        let spacing = self.tick_size_inner.max(0.0) + self.tick_padding;
        let mut domain = PathData::new();
        let anchor = match self.orient {
            Orient::Bottom => {
                domain.move_to(r0, outer);
                domain.line_to(r0, 0.0);
                domain.line_to(r1, 0.0);
                domain.line_to(r1, outer);
                "middle"
            }
            Orient::Left => {
                domain.move_to(-outer, r0);
                domain.line_to(0.0, r0);
                domain.line_to(0.0, r1);
                domain.line_to(-outer, r1);
                "end"
            }
        };

        let mut group = Node::group(id)
            .attr("class", "axis")
            .attr("fill", "none")
            .attr("font-size", "10")
            .attr("font-family", "sans-serif")
            .attr("text-anchor", anchor)
            .child(
                Node::path(format!("{id}-domain"), domain)
                    .attr("class", "domain")
                    .attr("stroke", "currentColor"),
            );

        for (i, tick) in self.ticks.iter().enumerate() {
            let (transform, line, label) = match self.orient {
                Orient::Bottom => (
                    Transform::translate(tick.position, 0.0),
                    Node::line(format!("{id}-line-{i}"), 0.0, 0.0, 0.0, self.tick_size_inner),
                    Node::text(format!("{id}-label-{i}"), 0.0, spacing, tick.label.clone())
                        .attr("dy", "0.71em"),
                ),
                Orient::Left => (
                    Transform::translate(0.0, tick.position),
                    Node::line(format!("{id}-line-{i}"), 0.0, 0.0, -self.tick_size_inner, 0.0),
                    Node::text(format!("{id}-label-{i}"), -spacing, 0.0, tick.label.clone())
                        .attr("dy", "0.32em"),
                ),
            };
            let label = match self.label_transform {
                Some(t) => label.transform(t),
                None => label,
            };
            let label = match self.label_anchor {
                Some(a) => label.attr("text-anchor", a),
                None => label,
            };
            group = group.child(
                Node::group(format!("{id}-tick-{i}"))
                    .attr("class", "tick")
                    .attr("opacity", "1")
                    .transform(transform)
                    .child(line.attr("stroke", "currentColor"))
                    .child(label.attr("fill", "currentColor")),
            );
        }
        group
    }
}
