//! Pointer interaction as an explicit state machine.
//!
//! A [`HoverMachine`] is fed [`PointerEvent`]s and answers with a [`Reaction`]: scene
//! patches (emphasis, focus markers) and the new tooltip state. The rendered scene is
//! never mutated behind the caller's back; [`HoverMachine::dispatch`] is the convenience
//! that applies the patches as well.

use crate::models::format_plain_number;
use crate::palette::HOVER_FILL;
use crate::scale::{LinearScale, bisect_left};
use crate::scene::{Geometry, Node, NodeId, Patch, Scene, Transition};
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Enter { node: NodeId, pos: (f64, f64) },
    Move { pos: (f64, f64) },
    Leave { node: NodeId },
}

impl PointerEvent {
    pub fn enter(node: impl Into<NodeId>, x: f64, y: f64) -> Self {
        PointerEvent::Enter {
            node: node.into(),
            pos: (x, y),
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        PointerEvent::Move { pos: (x, y) }
    }

    pub fn leave(node: impl Into<NodeId>) -> Self {
        PointerEvent::Leave { node: node.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum HoverState {
    #[default]
    Idle,
    Hovering { node: NodeId },
}

/// The floating `div.tooltip` next to a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub opacity: f64,
    /// CSS `left` / `top` in px, unset until the first pointer position is known.
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub html: String,
}

impl Default for Tooltip {
    fn default() -> Self {
        Self {
            opacity: 0.0,
            left: None,
            top: None,
            html: String::new(),
        }
    }
}

/// Tooltip text of one stacked segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentInfo {
    pub subgroup: String,
    pub value: String,
}

/// Focus marker that follows the pointer along the confidence-area line.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusTrack {
    pub overlay: NodeId,
    pub marker: NodeId,
    pub label: NodeId,
    pub x: LinearScale,
    pub y: LinearScale,
    /// Row values in input order.
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    /// Raw `(x, y)` cells per row, shown as-is in the label.
    pub labels: Vec<(String, String)>,
}

/// What hovering does for a given chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Behavior {
    #[default]
    Static,
    StackedBar {
        tooltip_offset: f64,
        segments: IndexMap<NodeId, SegmentInfo>,
    },
    Line {
        tooltip_offset: f64,
        /// Hit circle id to the measurement shown in the tooltip.
        targets: IndexMap<NodeId, f64>,
    },
    LineArea(FocusTrack),
}

impl Behavior {
    pub fn is_target(&self, node: &str) -> bool {
        match self {
            Behavior::Static => false,
            Behavior::StackedBar { segments, .. } => segments.contains_key(node),
            Behavior::Line { targets, .. } => targets.contains_key(node),
            Behavior::LineArea(track) => track.overlay == node,
        }
    }

    pub fn has_tooltip(&self) -> bool {
        matches!(self, Behavior::StackedBar { .. } | Behavior::Line { .. })
    }
}

const POINT_EMPHASIS: Transition = Transition::new(20, 200);
const TOOLTIP_SHOW: Transition = Transition::new(30, 200);
const TOOLTIP_HIDE: Transition = Transition::new(0, 100);
const EMPHASIS_RADIUS: f64 = 6.0;
const FOCUS_LABEL_OFFSET: f64 = 15.0;

/// Output of one event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reaction {
    pub patches: Vec<Patch>,
    /// New tooltip state, when it changed.
    pub tooltip: Option<Tooltip>,
    pub tooltip_transition: Option<Transition>,
}

impl Reaction {
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty() && self.tooltip.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct HoverMachine {
    behavior: Behavior,
    state: HoverState,
    tooltip: Tooltip,
    /// Pre-emphasis copy of the hovered node.
    original: Option<Node>,
}

impl HoverMachine {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            state: HoverState::Idle,
            tooltip: Tooltip::default(),
            original: None,
        }
    }

    pub fn state(&self) -> &HoverState {
        &self.state
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// Compute the reaction to `event` against the current `scene`.
    pub fn handle(&mut self, scene: &Scene, event: &PointerEvent) -> Reaction {
        let mut out = Reaction::default();
        match event {
            PointerEvent::Enter { node, pos } => {
                if !self.behavior.is_target(node) {
                    return out;
                }
                match std::mem::take(&mut self.state) {
                    HoverState::Hovering { node: prev } if prev != *node => {
                        self.revert(&prev, &mut out);
                        self.original = scene.find(node).cloned();
                    }
                    HoverState::Hovering { .. } => {}
                    HoverState::Idle => {
                        self.original = scene.find(node).cloned();
                    }
                }
                self.state = HoverState::Hovering { node: node.clone() };
                self.emphasize(scene, node, *pos, &mut out);
            }
            PointerEvent::Move { pos } => {
                if let HoverState::Hovering { node } = &self.state {
                    let node = node.clone();
                    self.track(scene, &node, *pos, &mut out);
                }
            }
            PointerEvent::Leave { node } => {
                let hovering = matches!(&self.state, HoverState::Hovering { node: n } if n == node);
                if hovering {
                    self.revert(node, &mut out);
                    self.state = HoverState::Idle;
                }
            }
        }
        if let Some(t) = &out.tooltip {
            self.tooltip = t.clone();
        }
        log::trace!("hover {:?} -> {:?}, {} patches", event, self.state, out.patches.len());
        out
    }

    /// [`handle`](Self::handle) and apply the resulting patches to `scene`.
    pub fn dispatch(&mut self, scene: &mut Scene, event: &PointerEvent) -> Reaction {
        let reaction = self.handle(scene, event);
        let applied = scene.apply_all(&reaction.patches);
        if applied != reaction.patches.len() {
            log::warn!(
                "{} of {} hover patches had no target",
                reaction.patches.len() - applied,
                reaction.patches.len()
            );
        }
        reaction
    }

    fn emphasize(&self, scene: &Scene, node: &str, pos: (f64, f64), out: &mut Reaction) {
        match &self.behavior {
            Behavior::Static => {}
            Behavior::StackedBar {
                tooltip_offset,
                segments,
            } => {
                if let Some(info) = segments.get(node) {
                    out.tooltip = Some(Tooltip {
                        opacity: 1.0,
                        html: format!("subgroup: {}<br>Value: {}", info.subgroup, info.value),
                        left: Some(pos.0 + tooltip_offset),
                        top: Some(pos.1),
                    });
                }
            }
            Behavior::Line {
                tooltip_offset,
                targets,
            } => {
                let Some(measurement) = targets.get(node) else {
                    return;
                };
                out.tooltip = Some(Tooltip {
                    opacity: 1.0,
                    html: format_plain_number(*measurement),
                    left: Some(pos.0 + tooltip_offset),
                    top: Some(pos.1),
                });
                out.tooltip_transition = Some(TOOLTIP_SHOW);
                out.patches.push(Patch::Raise { id: node.to_string() });
                if let Some(Geometry::Circle { cx, cy, .. }) = scene.find(node).map(|n| &n.geometry) {
                    out.patches.push(Patch::SetGeometry {
                        id: node.to_string(),
                        geometry: Geometry::Circle {
                            cx: *cx,
                            cy: *cy,
                            r: EMPHASIS_RADIUS,
                        },
                        transition: Some(POINT_EMPHASIS),
                    });
                }
                for (name, value) in [("opacity", "1"), ("fill", HOVER_FILL)] {
                    out.patches.push(Patch::SetAttr {
                        id: node.to_string(),
                        name: name.to_string(),
                        value: Some(value.to_string()),
                        transition: Some(POINT_EMPHASIS),
                    });
                }
            }
            Behavior::LineArea(track) => {
                for id in [&track.marker, &track.label] {
                    out.patches.push(Patch::SetAttr {
                        id: id.clone(),
                        name: "opacity".into(),
                        value: Some("1".into()),
                        transition: None,
                    });
                }
            }
        }
    }

    fn track(&self, scene: &Scene, node: &str, pos: (f64, f64), out: &mut Reaction) {
        match &self.behavior {
            Behavior::StackedBar { tooltip_offset, .. } => {
                out.tooltip = Some(Tooltip {
                    left: Some(pos.0 + tooltip_offset),
                    top: Some(pos.1),
                    ..self.tooltip.clone()
                });
            }
            Behavior::LineArea(track) if track.overlay == node => {
                let x0 = track.x.invert(pos.0);
                let i = bisect_left(&track.xs, x0, 1);
                let (Some(&dx), Some(&dy), Some((lx, ly))) =
                    (track.xs.get(i), track.ys.get(i), track.labels.get(i))
                else {
                    log::debug!("pointer at x={x0} is past the last row, ignored");
                    return;
                };
                let (px, py) = (track.x.apply(dx), track.y.apply(dy));
                let r = match scene.find(&track.marker).map(|n| &n.geometry) {
                    Some(Geometry::Circle { r, .. }) => *r,
                    _ => 0.0,
                };
                out.patches.push(Patch::SetGeometry {
                    id: track.marker.clone(),
                    geometry: Geometry::Circle { cx: px, cy: py, r },
                    transition: None,
                });
                out.patches.push(Patch::SetGeometry {
                    id: track.label.clone(),
                    geometry: Geometry::Text {
                        x: px + FOCUS_LABEL_OFFSET,
                        y: py,
                        content: format!("x:{lx}  -  y:{ly}"),
                    },
                    transition: None,
                });
            }
            // Line tooltips stay where the pointer entered.
            _ => {}
        }
    }

    fn revert(&mut self, node: &str, out: &mut Reaction) {
        match &self.behavior {
            Behavior::Static => {}
            Behavior::StackedBar { .. } => {
                out.tooltip = Some(Tooltip {
                    opacity: 0.0,
                    ..self.tooltip.clone()
                });
            }
            Behavior::Line { .. } => {
                out.tooltip = Some(Tooltip {
                    opacity: 0.0,
                    ..self.tooltip.clone()
                });
                out.tooltip_transition = Some(TOOLTIP_HIDE);
                if let Some(original) = self.original.take() {
                    out.patches.push(Patch::SetGeometry {
                        id: node.to_string(),
                        geometry: original.geometry.clone(),
                        transition: Some(POINT_EMPHASIS),
                    });
                    for name in ["opacity", "fill"] {
                        out.patches.push(Patch::SetAttr {
                            id: node.to_string(),
                            name: name.to_string(),
                            value: original.get_attr(name).map(str::to_string),
                            transition: Some(POINT_EMPHASIS),
                        });
                    }
                }
            }
            Behavior::LineArea(track) => {
                for id in [&track.marker, &track.label] {
                    out.patches.push(Patch::SetAttr {
                        id: id.clone(),
                        name: "opacity".into(),
                        value: Some("0".into()),
                        transition: None,
                    });
                }
            }
        }
        self.original = None;
    }
}
