use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Date format used by the line chart fixture (`07-Jan-2020`).
pub const FIXTURE_DATE_FORMAT: &str = "%d-%b-%Y";

/// One scalar cell of a fixture row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    Number(f64),
    Text(String),
    Date(NaiveDate),
    Missing,
}

impl Field {
    /// Numeric view of the cell, coercing text the way `+d[col]` would.
    ///
    /// Empty or whitespace-only text coerces to `0.0`; anything non-numeric becomes `NaN`.
    pub fn as_number(&self) -> f64 {
        match self {
            Field::Number(v) => *v,
            Field::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    0.0
                } else {
                    t.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            Field::Date(_) | Field::Missing => f64::NAN,
        }
    }

    /// Parse the cell as a fixture date; `None` when it does not match the format.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Field::Date(d) => Some(*d),
            Field::Text(s) => NaiveDate::parse_from_str(s.trim(), FIXTURE_DATE_FORMAT).ok(),
            _ => None,
        }
    }

    /// Text view used for category labels and tooltips.
    pub fn as_text(&self) -> String {
        match self {
            Field::Number(v) => format_plain_number(*v),
            Field::Text(s) => s.clone(),
            Field::Date(d) => d.format(FIXTURE_DATE_FORMAT).to_string(),
            Field::Missing => "undefined".to_string(),
        }
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Field::Text(s.to_string())
    }
}

impl From<f64> for Field {
    fn from(v: f64) -> Self {
        Field::Number(v)
    }
}

/// Format a number the way JavaScript stringifies it (`12`, `2.5`, `NaN`).
pub fn format_plain_number(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// One fixture row: column name to cell, in header order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record(pub IndexMap<String, Field>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for tests and inline datasets.
    pub fn with(mut self, column: &str, value: impl Into<Field>) -> Self {
        self.0.insert(column.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Field) {
        self.0.insert(column.into(), value);
    }

    /// Cell lookup; absent columns read as `Field::Missing`.
    pub fn get(&self, column: &str) -> &Field {
        static MISSING: Field = Field::Missing;
        self.0.get(column).unwrap_or(&MISSING)
    }

    pub fn number(&self, column: &str) -> f64 {
        self.get(column).as_number()
    }

    pub fn text(&self, column: &str) -> String {
        self.get(column).as_text()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }
}

/// A parsed fixture: the header plus the rows in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    /// Build a dataset whose header is taken from the first record's key order.
    pub fn from_records(records: Vec<Record>) -> Self {
        let columns = records
            .first()
            .map(|r| r.columns().map(str::to_string).collect())
            .unwrap_or_default();
        Self { columns, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// All columns except the first one (the series / subgroup columns).
    pub fn value_columns(&self) -> &[String] {
        self.columns.get(1..).unwrap_or(&[])
    }
}
