//! Scales mapping trace data onto chart pixels.
//!
//! The time scale works on epoch microseconds held as `f64`; real trace
//! timestamps (~1.7e15 µs) stay well inside the exactly-representable
//! integer range of an `f64`.

use std::collections::HashMap;

use crate::models::Micros;

const SECOND: f64 = 1_000_000.0;
const MINUTE: f64 = 60.0 * SECOND;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const WEEK: f64 = 7.0 * DAY;

/// Calendar-free tick intervals, in µs, ordered by duration.
const TICK_INTERVALS: [f64; 15] = [
    SECOND,
    5.0 * SECOND,
    15.0 * SECOND,
    30.0 * SECOND,
    MINUTE,
    5.0 * MINUTE,
    15.0 * MINUTE,
    30.0 * MINUTE,
    HOUR,
    3.0 * HOUR,
    6.0 * HOUR,
    12.0 * HOUR,
    DAY,
    2.0 * DAY,
    WEEK,
];

/// Domain used when there is nothing to plot.
const EMPTY_DOMAIN: (f64, f64) = (0.0, SECOND);

/// 1-2-5 decimal step covering `span` in roughly `count` steps.
pub fn tick_step(span: f64, count: usize) -> f64 {
    let step0 = span.abs() / count.max(1) as f64;
    if step0 <= 0.0 || !step0.is_finite() {
        return 0.0;
    }
    let mut step1 = 10f64.powf(step0.log10().floor());
    let error = step0 / step1;
    if error >= 50f64.sqrt() {
        step1 *= 10.0;
    } else if error >= 10f64.sqrt() {
        step1 *= 5.0;
    } else if error >= 2f64.sqrt() {
        step1 *= 2.0;
    }
    step1
}

/// Pick the tick interval (µs) for a time span: the closest calendar-free
/// interval, a decimal µs step below one second, whole days above a week.
pub fn tick_interval(span: f64, count: usize) -> f64 {
    let target = span.abs() / count.max(1) as f64;
    let i = TICK_INTERVALS.partition_point(|&d| d <= target);
    if i == 0 {
        tick_step(span, count).max(1.0)
    } else if i == TICK_INTERVALS.len() {
        (tick_step(span / DAY, count).max(1.0)).round() * DAY
    } else if target / TICK_INTERVALS[i - 1] < TICK_INTERVALS[i] / target {
        TICK_INTERVALS[i - 1]
    } else {
        TICK_INTERVALS[i]
    }
}

/// Linear scale from a µs time domain to a pixel range.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl TimeScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Scale spanning every given instant, or a 1 s epoch domain when empty.
    pub fn from_extent<I>(times: I, range: (f64, f64)) -> Self
    where
        I: IntoIterator<Item = Micros>,
    {
        let extent = times.into_iter().fold(None, |acc: Option<(Micros, Micros)>, t| {
            Some(match acc {
                Some((lo, hi)) => (lo.min(t), hi.max(t)),
                None => (t, t),
            })
        });
        let domain = match extent {
            Some((lo, hi)) => (lo as f64, hi as f64),
            None => EMPTY_DOMAIN,
        };
        Self::new(domain, range)
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Extend the domain outward to whole tick intervals.
    pub fn nice(mut self, count: usize) -> Self {
        let (d0, d1) = self.domain;
        let step = tick_interval(d1 - d0, count);
        if step > 0.0 {
            self.domain = ((d0 / step).floor() * step, (d1 / step).ceil() * step);
        }
        self
    }

    pub fn scale(&self, t: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0 + (r1 - r0) / 2.0;
        }
        r0 + (t - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn invert(&self, px: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return d0;
        }
        d0 + (px - r0) / (r1 - r0) * (d1 - d0)
    }

    /// Tick instants inside the domain, aligned to the chosen interval.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        let (lo, hi) = if d0 <= d1 { (d0, d1) } else { (d1, d0) };
        let step = tick_interval(hi - lo, count);
        if step <= 0.0 {
            return vec![lo];
        }
        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

/// Categorical scale splitting a pixel range into padded, equal bands.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    index: HashMap<String, usize>,
    range: (f64, f64),
    padding: f64,
    step: f64,
    start: f64,
}

impl BandScale {
    /// `padding` applies both between bands and at the outer edges;
    /// leftover space is split evenly on both ends.
    pub fn new(domain: Vec<String>, range: (f64, f64), padding: f64) -> Self {
        let mut deduped: Vec<String> = Vec::with_capacity(domain.len());
        let mut index = HashMap::new();
        for name in domain {
            if !index.contains_key(&name) {
                index.insert(name.clone(), deduped.len());
                deduped.push(name);
            }
        }

        let n = deduped.len() as f64;
        let (r0, r1) = range;
        let step = (r1 - r0) / (n - padding + padding * 2.0).max(1.0);
        let start = r0 + (r1 - r0 - step * (n - padding)) * 0.5;

        Self {
            domain: deduped,
            index,
            range,
            padding,
            step,
            start,
        }
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn bandwidth(&self) -> f64 {
        self.step * (1.0 - self.padding)
    }

    pub fn position(&self, name: &str) -> Option<f64> {
        self.index
            .get(name)
            .map(|&i| self.start + self.step * i as f64)
    }

    /// Vertical center of a band.
    pub fn center(&self, name: &str) -> Option<f64> {
        self.position(name).map(|y| y + self.bandwidth() / 2.0)
    }
}

/// The ten-color category palette.
pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Assigns palette colors to names in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct OrdinalColor {
    assigned: HashMap<String, usize>,
}

impl OrdinalColor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(&mut self, name: &str) -> &'static str {
        let next = self.assigned.len();
        let slot = *self.assigned.entry(name.to_string()).or_insert(next);
        CATEGORY10[slot % CATEGORY10.len()]
    }
}
