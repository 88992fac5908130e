//! Range facet values: bounds, calendar gaps and range specs.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper limit on buckets enumerated from a range spec.
const MAX_ENUMERATED_BUCKETS: usize = 10_000;

/// Kind of values a range facet spans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueDomain {
    Integer,
    Decimal,
    Date,
}

/// One end of a range bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Number(f64),
    Date(DateTime<Utc>),
}

impl Bound {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Bound::Number(n) => Some(*n),
            Bound::Date(_) => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Bound::Number(_) => None,
            Bound::Date(d) => Some(*d),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Bound::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Bound::Date(_) => serde_json::Value::String(self.to_string()),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Number(n) => write!(f, "{}", n),
            Bound::Date(d) => f.write_str(&d.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

impl FromStr for Bound {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<f64>() {
            if n.is_finite() {
                return Ok(Bound::Number(n));
            }
        }
        DateTime::parse_from_rfc3339(s)
            .map(|d| Bound::Date(d.with_timezone(&Utc)))
            .map_err(|_| format!("'{}' is neither a number nor an RFC 3339 date", s))
    }
}

/// A half-open `[from, to)` bucket of a range facet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeBucket {
    #[serde(alias = "start")]
    pub from: Bound,
    #[serde(alias = "end")]
    pub to: Bound,
}

impl RangeBucket {
    pub fn new(from: Bound, to: Bound) -> Self {
        Self { from, to }
    }

    pub fn label(&self) -> String {
        format!("{} - {}", self.from, self.to)
    }
}

/// Calendar unit of a date gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateUnit {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl DateUnit {
    /// Nominal length in seconds. Months count as 30 days, years as 365.
    pub fn nominal_seconds(&self) -> i64 {
        match self {
            DateUnit::Second => 1,
            DateUnit::Minute => 60,
            DateUnit::Hour => 3_600,
            DateUnit::Day => 86_400,
            DateUnit::Month => 30 * 86_400,
            DateUnit::Year => 365 * 86_400,
        }
    }

    fn math_name(&self) -> &'static str {
        match self {
            DateUnit::Second => "SECONDS",
            DateUnit::Minute => "MINUTES",
            DateUnit::Hour => "HOURS",
            DateUnit::Day => "DAYS",
            DateUnit::Month => "MONTHS",
            DateUnit::Year => "YEARS",
        }
    }

    fn parse_math_name(s: &str) -> Option<Self> {
        match s.trim_end_matches('S') {
            "SECOND" => Some(DateUnit::Second),
            "MINUTE" => Some(DateUnit::Minute),
            "HOUR" => Some(DateUnit::Hour),
            "DAY" | "DATE" => Some(DateUnit::Day),
            "MONTH" => Some(DateUnit::Month),
            "YEAR" => Some(DateUnit::Year),
            _ => None,
        }
    }

    /// Round a timestamp down to the start of its unit
    pub fn floor(&self, dt: DateTime<Utc>) -> DateTime<Utc> {
        let date = dt.date_naive();
        let floored = match self {
            DateUnit::Second => date.and_hms_opt(dt.hour(), dt.minute(), dt.second()),
            DateUnit::Minute => date.and_hms_opt(dt.hour(), dt.minute(), 0),
            DateUnit::Hour => date.and_hms_opt(dt.hour(), 0, 0),
            DateUnit::Day => date.and_hms_opt(0, 0, 0),
            DateUnit::Month => NaiveDate::from_ymd_opt(dt.year(), dt.month(), 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            DateUnit::Year => {
                NaiveDate::from_ymd_opt(dt.year(), 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
            }
        };
        floored.map(|naive| naive.and_utc()).unwrap_or(dt)
    }
}

/// Width of a date bucket, written in date-math form (`+5MINUTES`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateGap {
    pub amount: u32,
    pub unit: DateUnit,
}

impl DateGap {
    pub const fn new(amount: u32, unit: DateUnit) -> Self {
        Self { amount, unit }
    }

    pub fn nominal_seconds(&self) -> i64 {
        self.unit.nominal_seconds() * i64::from(self.amount)
    }

    /// Advance `dt` by one gap, using calendar arithmetic for months and years
    pub fn add_to(&self, dt: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.unit {
            DateUnit::Month => dt.checked_add_months(Months::new(self.amount)),
            DateUnit::Year => dt.checked_add_months(Months::new(self.amount.checked_mul(12)?)),
            _ => dt.checked_add_signed(Duration::seconds(self.nominal_seconds())),
        }
    }
}

impl fmt::Display for DateGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}{}", self.amount, self.unit.math_name())
    }
}

impl FromStr for DateGap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.trim().trim_start_matches('+').to_ascii_uppercase();
        let split = body
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(body.len());
        let (digits, unit) = body.split_at(split);
        let amount = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<u32>()
                .map_err(|e| format!("invalid date gap '{}': {}", s, e))?
        };
        if amount == 0 {
            return Err(format!("invalid date gap '{}': amount must be positive", s));
        }
        let unit = DateUnit::parse_math_name(unit)
            .ok_or_else(|| format!("invalid date gap '{}': unknown unit", s))?;
        Ok(DateGap { amount, unit })
    }
}

impl TryFrom<String> for DateGap {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateGap> for String {
    fn from(gap: DateGap) -> Self {
        gap.to_string()
    }
}

/// Numeric histogram bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub start: f64,
    pub end: f64,
    pub gap: f64,
    /// Field holds whole numbers, so gaps never go below 1
    #[serde(default)]
    pub integral: bool,
}

/// Date histogram bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub gap: DateGap,
}

/// `start`, `end` and `gap` of a range facet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeSpec {
    Numeric(NumericRange),
    Date(DateRange),
}

impl RangeSpec {
    pub fn domain(&self) -> ValueDomain {
        match self {
            RangeSpec::Numeric(r) if r.integral => ValueDomain::Integer,
            RangeSpec::Numeric(_) => ValueDomain::Decimal,
            RangeSpec::Date(_) => ValueDomain::Date,
        }
    }

    pub fn start(&self) -> Bound {
        match self {
            RangeSpec::Numeric(r) => Bound::Number(r.start),
            RangeSpec::Date(r) => Bound::Date(r.start),
        }
    }

    pub fn end(&self) -> Bound {
        match self {
            RangeSpec::Numeric(r) => Bound::Number(r.end),
            RangeSpec::Date(r) => Bound::Date(r.end),
        }
    }

    /// Gap as sent to the engine (`5`, `+1DAYS`)
    pub fn gap_string(&self) -> String {
        match self {
            RangeSpec::Numeric(r) => r.gap.to_string(),
            RangeSpec::Date(r) => r.gap.to_string(),
        }
    }

    /// Number of buckets between start and end
    pub fn bucket_count(&self) -> u64 {
        match self {
            RangeSpec::Numeric(r) => numeric_bucket_count(r.end - r.start, r.gap),
            RangeSpec::Date(r) => date_bucket_count(r.start, r.end, &r.gap),
        }
    }

    /// Upper bound of the bucket starting at `lower`
    pub fn upper_of(&self, lower: &Bound) -> Option<Bound> {
        match (self, lower) {
            (RangeSpec::Numeric(r), Bound::Number(n)) => {
                let decimals = decimals_of(r.gap).max(decimals_of(*n));
                Some(Bound::Number(round_to(n + r.gap, decimals)))
            }
            (RangeSpec::Date(r), Bound::Date(d)) => r.gap.add_to(*d).map(Bound::Date),
            _ => None,
        }
    }

    /// Buckets covering `[start, end)`, in order
    pub fn buckets(&self) -> Vec<RangeBucket> {
        let mut buckets = Vec::new();
        let mut lower = self.start();
        let end = self.end();
        while buckets.len() < MAX_ENUMERATED_BUCKETS && bound_lt(&lower, &end) {
            let Some(upper) = self.upper_of(&lower) else {
                break;
            };
            if !bound_lt(&lower, &upper) {
                break;
            }
            buckets.push(RangeBucket::new(lower, upper));
            lower = upper;
        }
        buckets
    }

    /// The bucket whose lower bound is exactly `lower`
    pub fn bucket_at(&self, lower: &Bound) -> Option<RangeBucket> {
        self.buckets().into_iter().find(|b| b.from == *lower)
    }
}

fn bound_lt(a: &Bound, b: &Bound) -> bool {
    match (a, b) {
        (Bound::Number(x), Bound::Number(y)) => x < y,
        (Bound::Date(x), Bound::Date(y)) => x < y,
        _ => false,
    }
}

/// `ceil(span / gap)`, at least one bucket
pub fn numeric_bucket_count(span: f64, gap: f64) -> u64 {
    if gap.is_nan() || gap <= 0.0 || !span.is_finite() || span <= 0.0 {
        return 1;
    }
    // Tolerance absorbs float noise such as 2.0000000000000004 buckets
    ((span / gap) - 1e-9).ceil().max(1.0) as u64
}

/// Bucket count of a date span using the gap's nominal length
pub fn date_bucket_count(start: DateTime<Utc>, end: DateTime<Utc>, gap: &DateGap) -> u64 {
    let span_ms = (end - start).num_milliseconds();
    let gap_ms = gap.nominal_seconds().saturating_mul(1000);
    if span_ms <= 0 || gap_ms <= 0 {
        return 1;
    }
    ((span_ms + gap_ms - 1) / gap_ms) as u64
}

/// Decimal places needed to write `gap` exactly.
///
/// The search starts at the gap's own order of magnitude, so tiny gaps such
/// as `5e-15` keep all of their significant digits.
pub fn decimals_of(gap: f64) -> i32 {
    let gap = gap.abs();
    if !gap.is_normal() {
        return 0;
    }
    let first = (-gap.log10().floor()).max(0.0) as i32;
    for d in first..first + 12 {
        let scaled = gap * 10f64.powi(d);
        if (scaled - scaled.round()).abs() < 1e-9 * scaled.abs().max(1.0) {
            return d;
        }
    }
    first + 12
}

/// `value` rounded to `decimals` places, unchanged when the scaling overflows
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if !factor.is_normal() || !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}
