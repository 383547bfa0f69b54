use chartdeck::config::{ChartConfig, ChartKind};
use chartdeck::interaction::{HoverState, PointerEvent};
use chartdeck::loader::{FixtureSource, load_fixture};
use chartdeck::render_chart;
use chartdeck::scene::{Patch, Transition};
use std::path::PathBuf;

fn chart(kind: ChartKind) -> chartdeck::ChartScene {
    let name = kind.default_fixture().unwrap();
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/data").join(name);
    let data = load_fixture(&FixtureSource::from(path)).unwrap();
    render_chart(&data, &ChartConfig::for_kind(kind)).unwrap()
}

#[test]
fn line_hover_round_trip_restores_circle() {
    let mut chart = chart(ChartKind::Line);
    let original = chart.scene.clone();
    let mut hover = chart.hover_machine();

    let enter = hover.dispatch(&mut chart.scene, &PointerEvent::enter("hit-2-4", 300.0, 120.0));
    assert!(enter.patches.contains(&Patch::Raise { id: "hit-2-4".into() }));
    assert!(enter.patches.iter().any(|p| matches!(
        p,
        Patch::SetAttr { name, transition: Some(t), .. } if name == "fill" && *t == Transition::new(20, 200)
    )));
    assert_eq!(hover.tooltip().opacity, 1.0);
    assert_eq!(hover.tooltip().html, "10");
    assert_eq!(hover.tooltip().left, Some(325.0));

    let leave = hover.dispatch(&mut chart.scene, &PointerEvent::leave("hit-2-4"));
    assert_eq!(leave.tooltip_transition, Some(Transition::new(0, 100)));
    assert_eq!(hover.state(), &HoverState::Idle);
    assert_eq!(hover.tooltip().opacity, 0.0);

    let before = original.find("hit-2-4").unwrap();
    let after = chart.scene.find("hit-2-4").unwrap();
    assert_eq!(after.geometry, before.geometry);
    assert_eq!(after.attrs, before.attrs);
}

#[test]
fn stacked_hover_shows_subgroup_and_raw_value() {
    let mut chart = chart(ChartKind::StackedBar);
    let mut hover = chart.hover_machine();
    // layer 2 = "stress", record 1 = poacee
    hover.dispatch(&mut chart.scene, &PointerEvent::enter("seg-2-1", 40.0, 60.0));
    assert_eq!(hover.tooltip().html, "subgroup: stress<br>Value: 33");
    assert_eq!(hover.tooltip().left, Some(130.0));
    hover.dispatch(&mut chart.scene, &PointerEvent::leave("seg-2-1"));
    assert_eq!(hover.tooltip().opacity, 0.0);
}

#[test]
fn static_charts_ignore_pointer_events() {
    let mut chart = chart(ChartKind::Bar);
    let before = chart.scene.clone();
    let mut hover = chart.hover_machine();
    assert!(hover.dispatch(&mut chart.scene, &PointerEvent::enter("bar-0", 1.0, 1.0)).is_empty());
    assert_eq!(chart.scene, before);
    assert!(!chart.has_tooltip());
}

#[test]
fn line_area_focus_tracks_rows() {
    let mut chart = chart(ChartKind::LineArea);
    let mut hover = chart.hover_machine();
    hover.dispatch(&mut chart.scene, &PointerEvent::enter("overlay", 0.0, 0.0));
    // invert(480) = 50.5 → first x >= 50.5 is row x = 51
    hover.dispatch(&mut chart.scene, &PointerEvent::moved(480.0, 10.0));
    let focus = chart.scene.find("focus").unwrap();
    assert_eq!(focus.get_attr("opacity"), Some("1"));
    match focus.geometry {
        chartdeck::scene::Geometry::Circle { cx, r, .. } => {
            assert!((cx - (51.0 - 1.0) / 99.0 * 960.0).abs() < 1e-9);
            assert_eq!(r, 8.5);
        }
        ref other => panic!("focus should be a circle: {other:?}"),
    }
    hover.dispatch(&mut chart.scene, &PointerEvent::leave("overlay"));
    assert_eq!(chart.scene.find("focus").unwrap().get_attr("opacity"), Some("0"));
}
