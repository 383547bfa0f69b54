//! SVG serialization of a [`Scene`].

use crate::scene::{Geometry, Node, Scene, num};
use std::fmt::Write;

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Render a scene as a standalone `<svg>` element.
pub fn to_svg_string(scene: &Scene) -> String {
    let mut out = String::new();
    let (x, y, w, h) = scene.view_box;
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}""#,
        num(x),
        num(y),
        num(w),
        num(h)
    );
    for (k, v) in &scene.attrs {
        let _ = write!(out, r#" {}="{}""#, k, escape_xml(v));
    }
    out.push('>');
    for node in &scene.children {
        write_node(&mut out, node, 1);
    }
    out.push_str("\n</svg>\n");
    out
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    let tag = node.geometry.tag();
    let _ = write!(out, "\n{indent}<{tag} data-key=\"{}\"", escape_xml(&node.id));
    match &node.geometry {
        Geometry::Group => {}
        Geometry::Rect {
            x,
            y,
            width,
            height,
        } => {
            let _ = write!(
                out,
                r#" x="{}" y="{}" width="{}" height="{}""#,
                num(*x),
                num(*y),
                num(*width),
                num(*height)
            );
        }
        Geometry::Circle { cx, cy, r } => {
            let _ = write!(out, r#" cx="{}" cy="{}" r="{}""#, num(*cx), num(*cy), num(*r));
        }
        Geometry::Path(d) => {
            let _ = write!(out, r#" d="{d}""#);
        }
        Geometry::Polyline(points) => {
            let pts: Vec<String> = points
                .iter()
                .map(|(x, y)| format!("{},{}", num(*x), num(*y)))
                .collect();
            let _ = write!(out, r#" points="{}""#, pts.join(" "));
        }
        Geometry::Line { x1, y1, x2, y2 } => {
            let _ = write!(
                out,
                r#" x1="{}" y1="{}" x2="{}" y2="{}""#,
                num(*x1),
                num(*y1),
                num(*x2),
                num(*y2)
            );
        }
        Geometry::Text { x, y, .. } => {
            let _ = write!(out, r#" x="{}" y="{}""#, num(*x), num(*y));
        }
    }
    if let Some(t) = &node.transform {
        let _ = write!(out, r#" transform="{t}""#);
    }
    for (k, v) in &node.attrs {
        let _ = write!(out, r#" {}="{}""#, k, escape_xml(v));
    }

    match &node.geometry {
        Geometry::Text { content, .. } => {
            let _ = write!(out, ">{}</{tag}>", escape_xml(content));
        }
        _ if node.children.is_empty() => out.push_str("/>"),
        _ => {
            out.push('>');
            for child in &node.children {
                write_node(out, child, depth + 1);
            }
            let _ = write!(out, "\n{indent}</{tag}>");
        }
    }
}
