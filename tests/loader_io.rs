use chartdeck::loader::{FixtureFormat, FixtureSource, LoadError, load_fixture, load_fixture_as};
use std::fs;
use std::path::PathBuf;

fn stock(name: &str) -> FixtureSource {
    FixtureSource::from(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/data").join(name))
}

#[test]
fn stock_csv_fixtures_keep_header_order() {
    let bar = load_fixture(&stock("barchart.csv")).unwrap();
    assert_eq!(bar.columns, vec!["Country", "Value"]);
    assert_eq!(bar.len(), 10);
    assert_eq!(bar.records[0].text("Country"), "United States");

    let stacked = load_fixture(&stock("stackedbarchart.csv")).unwrap();
    assert_eq!(stacked.value_columns(), ["Nitrogen", "normal", "stress"]);

    let area = load_fixture(&stock("lineareachart.csv")).unwrap();
    assert_eq!(area.len(), 100);
    assert_eq!(area.records[99].number("x"), 100.0);
}

#[test]
fn json_records_and_flat_objects() {
    let tickets = load_fixture(&stock("stackedbarchart.json")).unwrap();
    assert_eq!(
        tickets.columns,
        vec!["conference_name", "tickets_sold", "tickets_available"]
    );
    assert_eq!(tickets.records[2].number("tickets_sold"), 41.0);

    let donut = load_fixture(&stock("donut.json")).unwrap();
    assert_eq!(donut.columns, vec!["key", "value"]);
    let keys: Vec<String> = donut.records.iter().map(|r| r.text("key")).collect();
    assert_eq!(keys, vec!["a", "b", "c", "d", "e", "f", "g", "h"]);
}

#[test]
fn line_dates_parse_with_fixture_format() {
    let line = load_fixture(&stock("linechart.csv")).unwrap();
    let first = line.records[0].get("date").as_date().unwrap();
    assert_eq!(first.to_string(), "2020-01-01");
}

#[test]
fn explicit_format_overrides_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.txt");
    fs::write(&path, "cat,val\nx,1\n").unwrap();
    let src = FixtureSource::from(path);
    assert!(matches!(load_fixture(&src), Err(LoadError::UnsupportedFormat(_))));
    let ds = load_fixture_as(&src, FixtureFormat::Csv).unwrap();
    assert_eq!(ds.records[0].number("val"), 1.0);
}

#[test]
fn missing_file_and_bad_shape_are_errors() {
    let missing = FixtureSource::from("no/such/barchart.csv");
    let err = load_fixture(&missing).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
    assert!(err.to_string().contains("no/such/barchart.csv"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scalar.json");
    fs::write(&path, "42").unwrap();
    assert!(matches!(
        load_fixture(&FixtureSource::from(path)),
        Err(LoadError::Shape(_))
    ));
}

#[test]
fn relative_paths_resolve_against_base() {
    let src = FixtureSource::from("data/barchart.csv").resolve_against(std::path::Path::new("assets"));
    assert_eq!(src, FixtureSource::Path(PathBuf::from("assets/data/barchart.csv")));
    let url = FixtureSource::from("https://example.org/x.csv").resolve_against(std::path::Path::new("assets"));
    assert!(matches!(url, FixtureSource::Url(_)));
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn fetch_fixture_over_http() {
    // A flat object at top level comes back as key/value rows.
    let src = FixtureSource::from("https://httpbin.org/json");
    let ds = load_fixture_as(&src, FixtureFormat::Json).unwrap();
    assert_eq!(ds.columns, vec!["key", "value"]);
    assert!(!ds.is_empty());
}
