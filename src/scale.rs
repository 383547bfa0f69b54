//! Scales: band (categorical), linear, time and ordinal colour, plus d3-compatible ticks.
//!
//! All scales are plain values built per render call; they map a domain value to a
//! pixel coordinate and, where meaningful, back.

use chrono::{NaiveDate, NaiveTime};
use num_format::{Locale, ToFormattedString};

/// Categorical scale partitioning `[r0, r1]` into equal-width bands.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
    align: f64,
    step: f64,
    bandwidth: f64,
    start: f64,
}

impl BandScale {
    /// Build from categories in input order; duplicates keep their first position.
    pub fn new<I, S>(categories: I, range: (f64, f64)) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut domain: Vec<String> = Vec::new();
        for c in categories {
            let c = c.into();
            if !domain.contains(&c) {
                domain.push(c);
            }
        }
        let mut s = Self {
            domain,
            range,
            padding_inner: 0.0,
            padding_outer: 0.0,
            align: 0.5,
            step: 0.0,
            bandwidth: 0.0,
            start: 0.0,
        };
        s.rescale();
        s
    }

    /// Set inner and outer padding together (fraction of the step, clamped to `[0, 1]`).
    pub fn padding(mut self, p: f64) -> Self {
        let p = p.clamp(0.0, 1.0);
        self.padding_inner = p;
        self.padding_outer = p;
        self.rescale();
        self
    }

    fn rescale(&mut self) {
        let n = self.domain.len() as f64;
        let (r0, r1) = self.range;
        let (lo, hi) = if r1 < r0 { (r1, r0) } else { (r0, r1) };
        self.step = (hi - lo) / (n - self.padding_inner + self.padding_outer * 2.0).max(1.0);
        self.start = lo + (hi - lo - self.step * (n - self.padding_inner)) * self.align;
        self.bandwidth = self.step * (1.0 - self.padding_inner);
    }

    fn position(&self, i: usize) -> f64 {
        // A reversed range hands out the slots from the far end.
        let slot = if self.range.1 < self.range.0 {
            self.domain.len() - 1 - i
        } else {
            i
        };
        self.start + self.step * slot as f64
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Start coordinate of the band for `category`, `None` if it is not in the domain.
    pub fn apply(&self, category: &str) -> Option<f64> {
        self.domain
            .iter()
            .position(|c| c == category)
            .map(|i| self.position(i))
    }

    /// Band start positions in domain order.
    pub fn positions(&self) -> Vec<f64> {
        (0..self.domain.len()).map(|i| self.position(i)).collect()
    }
}

/// Continuous linear scale `[d0, d1] -> [r0, r1]`. Values outside the domain extrapolate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
    pub round: bool,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            round: false,
        }
    }

    /// Round output coordinates to integers (`rangeRound`).
    pub fn rounded(mut self) -> Self {
        self.round = true;
        self
    }

    pub fn apply(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = if d1 - d0 == 0.0 {
            if d1.is_nan() { f64::NAN } else { 0.5 }
        } else {
            (v - d0) / (d1 - d0)
        };
        let out = r0 + t * (r1 - r0);
        if self.round { js_round(out) } else { out }
    }

    pub fn invert(&self, px: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = if r1 - r0 == 0.0 { 0.5 } else { (px - r0) / (r1 - r0) };
        d0 + t * (d1 - d0)
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }

    /// Formatter matching the precision of `ticks(count)`.
    pub fn tick_format(&self, count: usize) -> impl Fn(f64) -> String + use<> {
        let step = tick_step(self.domain.0, self.domain.1, count);
        move |v| format_tick(v, step)
    }
}

/// `Math.round` semantics: halves round towards positive infinity.
fn js_round(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Date scale mapping calendar days linearly onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    pub domain: (NaiveDate, NaiveDate),
    pub range: (f64, f64),
}

impl TimeScale {
    pub fn new(domain: (NaiveDate, NaiveDate), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Build from the extent of `dates`; `None` entries (unparseable cells) are ignored.
    pub fn from_extent<I>(dates: I, range: (f64, f64)) -> Option<Self>
    where
        I: IntoIterator<Item = Option<NaiveDate>>,
    {
        let mut lo: Option<NaiveDate> = None;
        let mut hi: Option<NaiveDate> = None;
        for d in dates.into_iter().flatten() {
            lo = Some(lo.map_or(d, |l| l.min(d)));
            hi = Some(hi.map_or(d, |h| h.max(d)));
        }
        Some(Self::new((lo?, hi?), range))
    }

    fn millis(d: NaiveDate) -> f64 {
        d.and_time(NaiveTime::MIN).and_utc().timestamp_millis() as f64
    }

    fn linear(&self) -> LinearScale {
        LinearScale::new(
            (Self::millis(self.domain.0), Self::millis(self.domain.1)),
            self.range,
        )
    }

    pub fn apply(&self, d: NaiveDate) -> f64 {
        self.linear().apply(Self::millis(d))
    }

    /// Map an optional date; unparseable dates land at `NaN`.
    pub fn apply_opt(&self, d: Option<NaiveDate>) -> f64 {
        d.map_or(f64::NAN, |d| self.apply(d))
    }

    /// One tick per day across the domain, inclusive.
    pub fn day_ticks(&self) -> Vec<NaiveDate> {
        let (lo, hi) = self.domain;
        lo.iter_days().take_while(|d| *d <= hi).collect()
    }
}

/// Category to colour, cycling through `range` in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalScale {
    domain: Vec<String>,
    range: Vec<String>,
}

impl OrdinalScale {
    pub fn new<I, S>(domain: I, range: &[&str]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domain: domain.into_iter().map(Into::into).collect(),
            range: range.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Colour for `key`; unknown keys are appended to the domain like an implicit scale.
    pub fn apply(&mut self, key: &str) -> String {
        if self.range.is_empty() {
            return String::new();
        }
        let idx = match self.domain.iter().position(|k| k == key) {
            Some(i) => i,
            None => {
                self.domain.push(key.to_string());
                self.domain.len() - 1
            }
        };
        self.range[idx % self.range.len()].clone()
    }
}

/// Leftmost index `i` in `lo..` with `xs[i] >= x` (d3 `bisector().left`).
pub fn bisect_left(xs: &[f64], x: f64, lo: usize) -> usize {
    let mut lo = lo.min(xs.len());
    let mut hi = xs.len();
    while lo < hi {
        let mid = (lo + hi) / 2;
        if xs[mid] < x {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Maximum over finite values, `None` if there are none.
pub fn max_finite<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
}

fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(i64, i64, f64)> {
    if !(count > 0.0) {
        return None;
    }
    let step = (stop - start) / count;
    if !step.is_finite() || step == 0.0 {
        return None;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    let (i1, i2, inc) = if power < 0.0 {
        let inc = 10f64.powf(-power) / factor;
        let mut i1 = (start * inc).round() as i64;
        let mut i2 = (stop * inc).round() as i64;
        if (i1 as f64) / inc < start {
            i1 += 1;
        }
        if (i2 as f64) / inc > stop {
            i2 -= 1;
        }
        (i1, i2, -inc)
    } else {
        let inc = 10f64.powf(power) * factor;
        let mut i1 = (start / inc).round() as i64;
        let mut i2 = (stop / inc).round() as i64;
        if (i1 as f64) * inc < start {
            i1 += 1;
        }
        if (i2 as f64) * inc > stop {
            i2 -= 1;
        }
        (i1, i2, inc)
    };
    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    Some((i1, i2, inc))
}

/// Uniformly spaced "nice" tick values in `[start, stop]` (d3-array `ticks`).
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if !start.is_finite() || !stop.is_finite() || count == 0 {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let reverse = stop < start;
    let (a, b) = if reverse { (stop, start) } else { (start, stop) };
    let Some((i1, i2, inc)) = tick_spec(a, b, count as f64) else {
        return Vec::new();
    };
    if i2 < i1 {
        return Vec::new();
    }
    let value = |i: i64| if inc < 0.0 { i as f64 / -inc } else { i as f64 * inc };
    let mut out: Vec<f64> = (i1..=i2).map(value).collect();
    if reverse {
        out.reverse();
    }
    out
}

/// Absolute spacing between consecutive ticks, `NaN` when no ticks exist.
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let (a, b) = if stop < start { (stop, start) } else { (start, stop) };
    match tick_spec(a, b, count as f64) {
        Some((_, _, inc)) if inc < 0.0 => 1.0 / -inc,
        Some((_, _, inc)) => inc,
        None => f64::NAN,
    }
}

/// Format a tick with thousands separators and as many decimals as `step` needs.
pub fn format_tick(v: f64, step: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    let precision = if step.is_finite() && step > 0.0 {
        (-step.abs().log10().floor()).max(0.0) as usize
    } else {
        0
    };
    let fixed = format!("{:.*}", precision, v.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (fixed.clone(), None),
    };
    let grouped = int_part
        .parse::<u64>()
        .map(|n| n.to_formatted_string(&Locale::en))
        .unwrap_or(int_part);
    let sign = if v < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "\u{2212}"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
