//! Scene graph produced by the chart orchestrators.
//!
//! A [`Scene`] is the in-memory form of one `<svg>` subtree: keyed nodes with typed geometry
//! and string presentation attributes. Data binding is expressed as an explicit
//! [`diff`] between two scenes, producing [`Patch`]es that [`Scene::apply`] replays.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::f64::consts::{PI, TAU};
use std::fmt;

/// Stable key of a node, derived from the record or series it was built from.
pub type NodeId = String;

/// Point on the unit circle in d3's angle convention: 0 at 12 o'clock, clockwise.
pub fn polar(center: (f64, f64), radius: f64, angle: f64) -> (f64, f64) {
    (
        center.0 + radius * angle.sin(),
        center.1 - radius * angle.cos(),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathCmd {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    /// Circular arc around `center` from angle `a0` to `a1` (radians, see [`polar`]).
    Arc {
        center: (f64, f64),
        radius: f64,
        a0: f64,
        a1: f64,
    },
    Close,
}

/// A path as a list of drawing commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathData(pub Vec<PathCmd>);

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.0.push(PathCmd::MoveTo(x, y));
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.0.push(PathCmd::LineTo(x, y));
    }

    pub fn arc(&mut self, center: (f64, f64), radius: f64, a0: f64, a1: f64) {
        self.0.push(PathCmd::Arc {
            center,
            radius,
            a0,
            a1,
        });
    }

    pub fn close(&mut self) {
        self.0.push(PathCmd::Close);
    }

    /// Vertices of the path in order (arc end points only).
    pub fn vertices(&self) -> Vec<(f64, f64)> {
        self.0
            .iter()
            .filter_map(|c| match *c {
                PathCmd::MoveTo(x, y) | PathCmd::LineTo(x, y) => Some((x, y)),
                PathCmd::Arc {
                    center,
                    radius,
                    a1,
                    ..
                } => Some(polar(center, radius, a1)),
                PathCmd::Close => None,
            })
            .collect()
    }

    /// Approximate the path by polylines, one per subpath. Closed subpaths repeat
    /// their first point at the end.
    pub fn flatten(&self, max_step: f64) -> Vec<Vec<(f64, f64)>> {
        let mut out: Vec<Vec<(f64, f64)>> = Vec::new();
        let mut cur: Vec<(f64, f64)> = Vec::new();
        for cmd in &self.0 {
            match *cmd {
                PathCmd::MoveTo(x, y) => {
                    if cur.len() > 1 {
                        out.push(std::mem::take(&mut cur));
                    }
                    cur.clear();
                    cur.push((x, y));
                }
                PathCmd::LineTo(x, y) => cur.push((x, y)),
                PathCmd::Arc {
                    center,
                    radius,
                    a0,
                    a1,
                } => {
                    let span = a1 - a0;
                    let n = ((span.abs() / max_step.max(1e-3)).ceil() as usize).max(1);
                    for i in 0..=n {
                        let a = a0 + span * i as f64 / n as f64;
                        cur.push(polar(center, radius, a));
                    }
                }
                PathCmd::Close => {
                    if let Some(&first) = cur.first() {
                        cur.push(first);
                    }
                    out.push(std::mem::take(&mut cur));
                }
            }
        }
        if cur.len() > 1 {
            out.push(cur);
        }
        out
    }
}

impl fmt::Display for PathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cmd in &self.0 {
            match *cmd {
                PathCmd::MoveTo(x, y) => write!(f, "M{},{}", num(x), num(y))?,
                PathCmd::LineTo(x, y) => write!(f, "L{},{}", num(x), num(y))?,
                PathCmd::Arc {
                    center,
                    radius,
                    a0,
                    a1,
                } => {
                    let span = a1 - a0;
                    let sweep = if span >= 0.0 { 1 } else { 0 };
                    let r = num(radius);
                    if span.abs() >= TAU - 1e-6 {
                        // A single SVG arc cannot draw a full circle; go through the antipode.
                        let mid = a0 + span / 2.0;
                        let (mx, my) = polar(center, radius, mid);
                        let (ex, ey) = polar(center, radius, a1);
                        write!(f, "A{r},{r},0,1,{sweep},{},{}", num(mx), num(my))?;
                        write!(f, "A{r},{r},0,1,{sweep},{},{}", num(ex), num(ey))?;
                    } else {
                        let large = if span.abs() > PI { 1 } else { 0 };
                        let (ex, ey) = polar(center, radius, a1);
                        write!(f, "A{r},{r},0,{large},{sweep},{},{}", num(ex), num(ey))?;
                    }
                }
                PathCmd::Close => f.write_str("Z")?,
            }
        }
        Ok(())
    }
}

/// Format a coordinate for SVG output: integers without decimals, others with at most
/// six, `NaN` kept verbatim so degenerate input stays visible in the markup.
pub fn num(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let rounded = (v * 1e6).round() / 1e6;
    if !rounded.is_finite() || rounded.abs() >= 1e15 {
        format!("{}", v)
    } else if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let s = format!("{:.6}", rounded);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Typed geometry of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Group,
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Path(PathData),
    Polyline(Vec<(f64, f64)>),
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
    },
}

impl Geometry {
    pub fn tag(&self) -> &'static str {
        match self {
            Geometry::Group => "g",
            Geometry::Rect { .. } => "rect",
            Geometry::Circle { .. } => "circle",
            Geometry::Path(_) => "path",
            Geometry::Polyline(_) => "polyline",
            Geometry::Line { .. } => "line",
            Geometry::Text { .. } => "text",
        }
    }
}

/// `translate(x,y)` optionally followed by `rotate(deg)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translate: (f64, f64),
    pub rotate: f64,
}

impl Transform {
    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            translate: (x, y),
            rotate: 0.0,
        }
    }

    pub fn rotated(mut self, deg: f64) -> Self {
        self.rotate = deg;
        self
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({},{})",
            num(self.translate.0),
            num(self.translate.1)
        )?;
        if self.rotate != 0.0 {
            write!(f, "rotate({})", num(self.rotate))?;
        }
        Ok(())
    }
}

/// One element of the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub geometry: Geometry,
    pub transform: Option<Transform>,
    pub attrs: IndexMap<String, String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, geometry: Geometry) -> Self {
        Self {
            id: id.into(),
            geometry,
            transform: None,
            attrs: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn group(id: impl Into<NodeId>) -> Self {
        Self::new(id, Geometry::Group)
    }

    pub fn rect(id: impl Into<NodeId>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(
            id,
            Geometry::Rect {
                x,
                y,
                width,
                height,
            },
        )
    }

    pub fn circle(id: impl Into<NodeId>, cx: f64, cy: f64, r: f64) -> Self {
        Self::new(id, Geometry::Circle { cx, cy, r })
    }

    pub fn path(id: impl Into<NodeId>, d: PathData) -> Self {
        Self::new(id, Geometry::Path(d))
    }

    pub fn polyline(id: impl Into<NodeId>, points: Vec<(f64, f64)>) -> Self {
        Self::new(id, Geometry::Polyline(points))
    }

    pub fn line(id: impl Into<NodeId>, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(id, Geometry::Line { x1, y1, x2, y2 })
    }

    pub fn text(id: impl Into<NodeId>, x: f64, y: f64, content: impl Into<String>) -> Self {
        Self::new(
            id,
            Geometry::Text {
                x,
                y,
                content: content.into(),
            },
        )
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn transform(mut self, t: Transform) -> Self {
        self.transform = Some(t);
        self
    }

    pub fn child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Same node apart from children.
    fn shallow_eq(&self, other: &Node) -> bool {
        self.geometry == other.geometry
            && self.transform == other.transform
            && self.attrs == other.attrs
    }
}

/// Timing of an attribute change (milliseconds). The scene stores end states only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transition {
    pub delay_ms: u32,
    pub duration_ms: u32,
}

impl Transition {
    pub const fn new(delay_ms: u32, duration_ms: u32) -> Self {
        Self {
            delay_ms,
            duration_ms,
        }
    }
}

/// A single change to a scene.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    /// Insert `node` under `parent` (`None` = root) at `index`.
    Enter {
        parent: Option<NodeId>,
        index: usize,
        node: Node,
    },
    /// Replace geometry, transform and attributes of an existing node (children untouched).
    Update {
        id: NodeId,
        geometry: Geometry,
        transform: Option<Transform>,
        attrs: IndexMap<String, String>,
    },
    /// Move an existing node to `index` among its siblings.
    Move { id: NodeId, index: usize },
    Exit { id: NodeId },
    SetAttr {
        id: NodeId,
        name: String,
        value: Option<String>,
        transition: Option<Transition>,
    },
    SetGeometry {
        id: NodeId,
        geometry: Geometry,
        transition: Option<Transition>,
    },
    /// Move a node to the end of its parent's children so it paints on top.
    Raise { id: NodeId },
}

/// The `<svg>` root of one chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    /// `min-x min-y width height`.
    pub view_box: (f64, f64, f64, f64),
    pub attrs: IndexMap<String, String>,
    pub children: Vec<Node>,
}

impl Scene {
    pub fn new(view_box: (f64, f64, f64, f64)) -> Self {
        Self {
            view_box,
            attrs: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        fn walk<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Node> {
            for n in nodes {
                if n.id == id {
                    return Some(n);
                }
                if let Some(found) = walk(&n.children, id) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.children, id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        find_in_mut(&mut self.children, id)
    }

    /// Depth-first iteration over every node.
    pub fn nodes(&self) -> Vec<&Node> {
        fn walk<'a>(nodes: &'a [Node], out: &mut Vec<&'a Node>) {
            for n in nodes {
                out.push(n);
                walk(&n.children, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.children, &mut out);
        out
    }

    /// Nodes carrying `class` in their `class` attribute.
    pub fn with_class(&self, class: &str) -> Vec<&Node> {
        self.nodes()
            .into_iter()
            .filter(|n| {
                n.get_attr("class")
                    .is_some_and(|c| c.split_whitespace().any(|c| c == class))
            })
            .collect()
    }

    fn children_of_mut(&mut self, parent: Option<&str>) -> Option<&mut Vec<Node>> {
        match parent {
            None => Some(&mut self.children),
            Some(id) => self.find_mut(id).map(|n| &mut n.children),
        }
    }

    fn siblings_of_mut(&mut self, id: &str) -> Option<&mut Vec<Node>> {
        fn walk<'a>(nodes: &'a mut Vec<Node>, id: &str) -> Option<&'a mut Vec<Node>> {
            if nodes.iter().any(|n| n.id == id) {
                return Some(nodes);
            }
            nodes.iter_mut().find_map(|n| walk(&mut n.children, id))
        }
        walk(&mut self.children, id)
    }

    /// Apply one patch. Returns `false` when its target does not exist.
    pub fn apply(&mut self, patch: &Patch) -> bool {
        match patch {
            Patch::Enter {
                parent,
                index,
                node,
            } => match self.children_of_mut(parent.as_deref()) {
                Some(list) => {
                    let at = (*index).min(list.len());
                    list.insert(at, node.clone());
                    true
                }
                None => false,
            },
            Patch::Update {
                id,
                geometry,
                transform,
                attrs,
            } => match self.find_mut(id) {
                Some(n) => {
                    n.geometry = geometry.clone();
                    n.transform = *transform;
                    n.attrs = attrs.clone();
                    true
                }
                None => false,
            },
            Patch::Move { id, index } => match self.siblings_of_mut(id) {
                Some(list) => {
                    let Some(pos) = list.iter().position(|n| &n.id == id) else {
                        return false;
                    };
                    let node = list.remove(pos);
                    let at = (*index).min(list.len());
                    list.insert(at, node);
                    true
                }
                None => false,
            },
            Patch::Exit { id } => match self.siblings_of_mut(id) {
                Some(list) => {
                    list.retain(|n| &n.id != id);
                    true
                }
                None => false,
            },
            Patch::SetAttr {
                id, name, value, ..
            } => match self.find_mut(id) {
                Some(n) => {
                    match value {
                        Some(v) => {
                            n.attrs.insert(name.clone(), v.clone());
                        }
                        None => {
                            n.attrs.shift_remove(name);
                        }
                    }
                    true
                }
                None => false,
            },
            Patch::SetGeometry { id, geometry, .. } => match self.find_mut(id) {
                Some(n) => {
                    n.geometry = geometry.clone();
                    true
                }
                None => false,
            },
            Patch::Raise { id } => match self.siblings_of_mut(id) {
                Some(list) => {
                    if let Some(pos) = list.iter().position(|n| &n.id == id) {
                        let node = list.remove(pos);
                        list.push(node);
                    }
                    true
                }
                None => false,
            },
        }
    }

    /// Apply patches in order; returns how many found their target.
    pub fn apply_all<'a>(&mut self, patches: impl IntoIterator<Item = &'a Patch>) -> usize {
        patches.into_iter().filter(|p| self.apply(p)).count()
    }
}

fn find_in_mut<'a>(nodes: &'a mut [Node], id: &str) -> Option<&'a mut Node> {
    for n in nodes.iter_mut() {
        if n.id == id {
            return Some(n);
        }
        if let Some(found) = find_in_mut(&mut n.children, id) {
            return Some(found);
        }
    }
    None
}

/// Keyed reconciliation: the patches that turn `old` into `new`.
///
/// Nodes are matched by id among siblings. Missing ids exit, new ids enter at their
/// target index, retained nodes are moved when their order changed and updated when
/// their own geometry, transform or attributes differ.
pub fn diff(old: &Scene, new: &Scene) -> Vec<Patch> {
    let mut out = Vec::new();
    diff_children(None, &old.children, &new.children, &mut out);
    out
}

fn diff_children(parent: Option<&str>, old: &[Node], new: &[Node], out: &mut Vec<Patch>) {
    let new_ids: HashSet<&str> = new.iter().map(|n| n.id.as_str()).collect();
    for o in old {
        if !new_ids.contains(o.id.as_str()) {
            out.push(Patch::Exit { id: o.id.clone() });
        }
    }
    let mut current: Vec<&str> = old
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| new_ids.contains(id))
        .collect();

    for (i, n) in new.iter().enumerate() {
        let existing = old.iter().find(|o| o.id == n.id);
        match existing {
            None => {
                out.push(Patch::Enter {
                    parent: parent.map(str::to_string),
                    index: i,
                    node: n.clone(),
                });
                current.insert(i.min(current.len()), n.id.as_str());
            }
            Some(o) => {
                if current.get(i) != Some(&n.id.as_str()) {
                    out.push(Patch::Move {
                        id: n.id.clone(),
                        index: i,
                    });
                    current.retain(|id| *id != n.id.as_str());
                    current.insert(i.min(current.len()), n.id.as_str());
                }
                if !o.shallow_eq(n) {
                    out.push(Patch::Update {
                        id: n.id.clone(),
                        geometry: n.geometry.clone(),
                        transform: n.transform,
                        attrs: n.attrs.clone(),
                    });
                }
                diff_children(Some(n.id.as_str()), &o.children, &n.children, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(values: &[(&str, f64)]) -> Scene {
        let mut s = Scene::new((0.0, 0.0, 100.0, 100.0));
        s.push(
            Node::group("bars").children(
                values
                    .iter()
                    .enumerate()
                    .map(|(i, (k, v))| Node::rect(format!("bar-{k}"), i as f64 * 10.0, 0.0, 8.0, *v)),
            ),
        );
        s
    }

    #[test]
    fn diff_then_apply_reproduces_target() {
        let old = bars(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]);
        let new = bars(&[("c", 3.0), ("d", 4.0), ("a", 5.0)]);
        let patches = diff(&old, &new);
        let mut s = old.clone();
        assert_eq!(s.apply_all(&patches), patches.len());
        assert_eq!(s, new);
    }

    #[test]
    fn diff_of_identical_scenes_is_empty() {
        let s = bars(&[("a", 1.0)]);
        assert!(diff(&s, &s).is_empty());
    }

    #[test]
    fn diff_classifies_enter_update_exit() {
        let old = bars(&[("a", 1.0), ("b", 2.0)]);
        let new = bars(&[("a", 9.0), ("b", 2.0), ("c", 3.0)]);
        let patches = diff(&old, &new);
        assert!(patches.iter().any(|p| matches!(p, Patch::Enter { node, .. } if node.id == "bar-c")));
        assert!(patches.iter().any(|p| matches!(p, Patch::Update { id, .. } if id == "bar-a")));
        assert!(!patches.iter().any(|p| matches!(p, Patch::Exit { .. })));
    }

    #[test]
    fn raise_moves_node_last() {
        let mut s = bars(&[("a", 1.0), ("b", 2.0)]);
        assert!(s.apply(&Patch::Raise { id: "bar-a".into() }));
        let ids: Vec<_> = s.children[0].children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["bar-b", "bar-a"]);
    }

    #[test]
    fn patches_for_unknown_nodes_report_false() {
        let mut s = bars(&[]);
        assert!(!s.apply(&Patch::Exit { id: "nope".into() }));
    }

    #[test]
    fn path_display_uses_svg_commands() {
        let mut d = PathData::new();
        d.move_to(0.0, 0.0);
        d.line_to(1.5, f64::NAN);
        d.close();
        assert_eq!(d.to_string(), "M0,0L1.5,NaNZ");
    }

    #[test]
    fn arc_flags_follow_span() {
        let mut d = PathData::new();
        d.arc((0.0, 0.0), 10.0, 0.0, PI / 2.0);
        assert_eq!(d.to_string(), "A10,10,0,0,1,10,0");
        let mut big = PathData::new();
        big.arc((0.0, 0.0), 10.0, 0.0, 1.5 * PI);
        assert!(big.to_string().starts_with("A10,10,0,1,1,"));
    }

    #[test]
    fn flatten_closes_subpaths() {
        let mut d = PathData::new();
        d.move_to(0.0, 0.0);
        d.line_to(1.0, 0.0);
        d.line_to(1.0, 1.0);
        d.close();
        let polys = d.flatten(0.1);
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].first(), polys[0].last());
    }

    #[test]
    fn num_trims_trailing_zeros() {
        assert_eq!(num(500.0), "500");
        assert_eq!(num(0.25), "0.25");
        assert_eq!(num(-0.0000001), "0");
        assert_eq!(num(f64::NAN), "NaN");
    }

    #[test]
    fn num_keeps_huge_values_exact() {
        assert_eq!(num(1e21), "1000000000000000000000");
        assert_eq!(num(-4e19), "-40000000000000000000");
        let huge = num(1e303);
        assert!(!huge.contains("inf"));
        assert_eq!(huge.parse::<f64>().unwrap(), 1e303);
    }
}
