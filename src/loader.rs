//! Fixture loading: CSV or JSON, from a local path or over HTTP.
//!
//! Cells are kept as text (CSV) or as their JSON scalar; numeric coercion happens at the
//! chart so malformed values surface as `NaN` instead of failing the load.
//!
//! Typical usage:
//! ```no_run
//! # use chartdeck::loader::{load_fixture, FixtureSource};
//! let ds = load_fixture(&FixtureSource::from("assets/data/barchart.csv"))?;
//! println!("{} rows, columns {:?}", ds.len(), ds.columns);
//! # Ok::<(), chartdeck::loader::LoadError>(())
//! ```
use crate::models::{Dataset, Field, Record};
use indexmap::IndexMap;
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read fixture {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request for {url} failed: {reason}")]
    Http { url: String, reason: String },
    #[error("unsupported fixture format: {0}")]
    UnsupportedFormat(String),
    #[error("unexpected fixture shape: {0}")]
    Shape(String),
}

/// Fixture encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureFormat {
    Csv,
    Json,
}

impl FixtureFormat {
    /// Infer the format from a file name or URL path.
    pub fn from_name(name: &str) -> Result<Self, LoadError> {
        let trimmed = name.split(['?', '#']).next().unwrap_or(name);
        let ext = Path::new(trimmed)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(FixtureFormat::Csv),
            Some("json") => Ok(FixtureFormat::Json),
            Some(other) => Err(LoadError::UnsupportedFormat(other.to_string())),
            None => Err(LoadError::UnsupportedFormat(name.to_string())),
        }
    }
}

/// Where a fixture lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureSource {
    Path(PathBuf),
    Url(String),
}

impl From<&str> for FixtureSource {
    fn from(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            FixtureSource::Url(s.to_string())
        } else {
            FixtureSource::Path(PathBuf::from(s))
        }
    }
}

impl From<PathBuf> for FixtureSource {
    fn from(p: PathBuf) -> Self {
        FixtureSource::Path(p)
    }
}

impl fmt::Display for FixtureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureSource::Path(p) => write!(f, "{}", p.display()),
            FixtureSource::Url(u) => f.write_str(u),
        }
    }
}

impl FixtureSource {
    /// Resolve relative paths against `base` (used for dashboard configs).
    pub fn resolve_against(self, base: &Path) -> Self {
        match self {
            FixtureSource::Path(p) if p.is_relative() => FixtureSource::Path(base.join(p)),
            other => other,
        }
    }

    fn name(&self) -> String {
        self.to_string()
    }
}

/// Load a fixture, inferring the format from its extension.
pub fn load_fixture(source: &FixtureSource) -> Result<Dataset, LoadError> {
    let format = FixtureFormat::from_name(&source.name())?;
    load_fixture_as(source, format)
}

/// Load a fixture with an explicit format.
pub fn load_fixture_as(source: &FixtureSource, format: FixtureFormat) -> Result<Dataset, LoadError> {
    let body = match source {
        FixtureSource::Path(p) => std::fs::read_to_string(p).map_err(|e| LoadError::Io {
            path: p.display().to_string(),
            source: e,
        })?,
        FixtureSource::Url(u) => fetch_text(u)?,
    };
    let ds = match format {
        FixtureFormat::Csv => parse_csv(body.as_bytes())?,
        FixtureFormat::Json => parse_json(&body)?,
    };
    log::debug!(
        "loaded {} rows from {} (columns: {:?})",
        ds.len(),
        source,
        ds.columns
    );
    Ok(ds)
}

/// Single GET without retry; a failed fetch is reported to the caller as-is.
fn fetch_text(url: &str) -> Result<String, LoadError> {
    let http_err = |reason: String| LoadError::Http {
        url: url.to_string(),
        reason,
    };
    let http = HttpClient::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(5))
        .user_agent(concat!("chartdeck/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| http_err(e.to_string()))?;
    let resp = http.get(url).send().map_err(|e| http_err(e.to_string()))?;
    if !resp.status().is_success() {
        return Err(http_err(format!("HTTP {}", resp.status())));
    }
    resp.text().map_err(|e| http_err(e.to_string()))
}

/// Parse CSV with a header row. Every cell is kept as text.
pub fn parse_csv<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let mut rec = Record::new();
        for (i, col) in columns.iter().enumerate() {
            // Short rows leave the trailing columns undefined.
            let field = match row.get(i) {
                Some(cell) => Field::Text(cell.to_string()),
                None => Field::Missing,
            };
            rec.insert(col.clone(), field);
        }
        records.push(rec);
    }
    Ok(Dataset::new(columns, records))
}

/// Parse a JSON fixture.
///
/// Accepts an array of flat objects (columns from the first object's key order), or a
/// single flat object which is expanded into `key,value` rows in key order.
pub fn parse_json(text: &str) -> Result<Dataset, LoadError> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Array(items) => {
            if let Some(i) = items.iter().position(|item| !item.is_object()) {
                return Err(LoadError::Shape(format!("array element {i} is not an object")));
            }
            // Re-read through IndexMap so key order follows the document.
            let rows: Vec<IndexMap<String, Value>> = serde_json::from_str(text)?;
            let columns: Vec<String> = rows
                .first()
                .map(|r| r.keys().cloned().collect())
                .unwrap_or_default();
            let records = rows
                .into_iter()
                .map(|row| {
                    let mut rec = Record::new();
                    for (k, v) in row {
                        rec.insert(k, json_scalar(v));
                    }
                    rec
                })
                .collect();
            Ok(Dataset::new(columns, records))
        }
        Value::Object(_) => {
            let obj: IndexMap<String, Value> = serde_json::from_str(text)?;
            let records = obj
                .into_iter()
                .map(|(k, v)| {
                    let mut rec = Record::new();
                    rec.insert("key", Field::Text(k));
                    rec.insert("value", json_scalar(v));
                    rec
                })
                .collect();
            Ok(Dataset::new(vec!["key".into(), "value".into()], records))
        }
        other => Err(LoadError::Shape(format!(
            "expected an array or object at top level, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_scalar(v: Value) -> Field {
    match v {
        Value::Number(n) => Field::Number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => Field::Text(s),
        Value::Bool(b) => Field::Number(if b { 1.0 } else { 0.0 }),
        Value::Null => Field::Missing,
        // Nested values are not part of any fixture contract; keep their text.
        nested => Field::Text(nested.to_string()),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
