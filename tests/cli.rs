use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;

fn data(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("assets/data")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("chartdeck").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("page"));
}

#[test]
fn render_bar_svg() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("bar.svg");
    let mut cmd = Command::cargo_bin("chartdeck").unwrap();
    cmd.args(["render", "--kind", "bar", "--data", &data("barchart.csv"), "--out"])
        .arg(&out);
    cmd.assert().success();
    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.contains(r#"viewBox="-30 -30 1050 590""#));
}

#[test]
fn render_inline_donut_with_custom_size() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("donut.svg");
    let mut cmd = Command::cargo_bin("chartdeck").unwrap();
    cmd.args(["render", "--kind", "donut", "--width", "300", "--height", "300", "--out"])
        .arg(&out);
    cmd.assert().success();
    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.contains("translate(150,150)"));
}

#[test]
fn page_from_stock_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("index.html");
    let mut cmd = Command::cargo_bin("chartdeck").unwrap();
    cmd.args(["page", "--data-dir"])
        .arg(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/data"))
        .arg("--out")
        .arg(&out);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("5 charts, 0 failed"));
    assert!(std::fs::read_to_string(&out).unwrap().contains("id=\"lineareachart\""));
}

#[test]
fn inspect_prints_columns() {
    let mut cmd = Command::cargo_bin("chartdeck").unwrap();
    cmd.args(["inspect", "--data", &data("linechart.csv")]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("columns: date, A, B, C"))
        .stdout(predicate::str::contains("rows: 7"));
}

#[test]
fn missing_fixture_fails_render() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("chartdeck").unwrap();
    cmd.args(["render", "--kind", "line", "--data", "nope.csv", "--out"])
        .arg(dir.path().join("x.svg"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("nope.csv"));
}

#[test]
fn unknown_kind_is_rejected() {
    let mut cmd = Command::cargo_bin("chartdeck").unwrap();
    cmd.args(["render", "--kind", "radar", "--out", "x.svg"]);
    cmd.assert().failure();
}
