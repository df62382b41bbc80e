//! Parsing of raw parameter and form values into typed values.
//!
//! Everything here is lenient in what it accepts (form inputs, ISO strings, epoch
//! milliseconds) and returns `None` instead of failing; callers decide whether a
//! failure drops a filter or becomes a [`QueryError`](crate::QueryError).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};
use serde_json::Value;
use tabula_schema::FieldKind;

use crate::filter::FilterValue;

/// Calendar-day layout.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a calendar day from a date or timestamp string.
///
/// Timestamps keep the day they name in their own offset; `2024-03-05T23:30:00-05:00`
/// is March 5th.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(day) = NaiveDate::parse_from_str(raw, DAY_FORMAT) {
        return Some(day);
    }
    parse_timestamp(raw).map(|ts| ts.local().date())
}

/// Midnight at the start of `day`.
pub fn start_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

/// 23:59:59.999 on `day`.
pub fn end_of_day(day: NaiveDate) -> NaiveDateTime {
    let last_milli = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    day.and_time(last_milli)
}

/// A timestamp as entered: with an explicit offset, or wall-clock only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// RFC 3339 timestamp carrying an offset.
    Zoned(DateTime<FixedOffset>),
    /// Timestamp without offset information.
    Naive(NaiveDateTime),
}

impl Timestamp {
    /// The wall-clock time the timestamp names.
    pub fn local(&self) -> NaiveDateTime {
        match self {
            Self::Zoned(dt) => dt.naive_local(),
            Self::Naive(dt) => *dt,
        }
    }

    /// The instant in UTC; offset-free values are taken to be UTC already.
    pub fn instant(&self) -> NaiveDateTime {
        match self {
            Self::Zoned(dt) => dt.naive_utc(),
            Self::Naive(dt) => *dt,
        }
    }

    /// Render at full precision.
    pub fn to_iso_string(&self) -> String {
        match self {
            Self::Zoned(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Self::Naive(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        }
    }
}

/// Parse a timestamp string.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(Timestamp::Zoned(dt));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(Timestamp::Naive)
}

/// Parse a timestamp from a JSON value: a string, or epoch milliseconds.
pub fn timestamp_from_json(value: &Value) -> Option<Timestamp> {
    match value {
        Value::String(s) => parse_timestamp(s)
            .or_else(|| parse_day(s).map(|day| Timestamp::Naive(start_of_day(day)))),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| Timestamp::Zoned(dt.fixed_offset())),
        _ => None,
    }
}

/// Parse a number, preferring an integer representation.
pub fn parse_number(raw: &str) -> Option<FilterValue> {
    let raw = raw.trim();
    if let Ok(i) = raw.parse::<i64>() {
        return Some(FilterValue::Int(i));
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(FilterValue::Float)
}

/// Check if `raw` is an unsigned integer literal.
pub fn is_unsigned_integer(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Interpret a form/JSON boolean. Only `true`, `"true"`, `"1"` and `1` are true.
pub fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim(), "true" | "1"),
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        _ => false,
    }
}

/// Convert a raw select value into the value type of its field.
///
/// `None` when a number, currency or boolean field receives a value of another type.
pub fn parse_scalar(kind: FieldKind, raw: &str) -> Option<FilterValue> {
    match kind {
        FieldKind::Number | FieldKind::Currency => parse_number(raw),
        FieldKind::Boolean => match raw.trim() {
            "true" | "1" => Some(FilterValue::Bool(true)),
            "false" | "0" => Some(FilterValue::Bool(false)),
            _ => None,
        },
        _ => Some(FilterValue::String(raw.to_string())),
    }
}

/// Stringify a JSON value for loose comparison.
///
/// Missing and null both stringify to the empty string; integral floats drop their
/// fraction so `5`, `5.0` and `"5"` compare equal.
pub fn stringify(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Some(other) => other.to_string(),
    }
}
