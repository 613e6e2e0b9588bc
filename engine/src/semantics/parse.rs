//! Filter value parsing
//!
//! Dates and times parse through an ordered fallback list of formats. A parsed value
//! is a half-open [`Span`] in microseconds: a date-only value covers the whole UTC day,
//! anything with a time component covers a single microsecond.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::core::constants::MICROS_PER_DAY;
use crate::filter::ScalarValue;

use super::value::{Number, time_to_micros};

/// Date/time formats carrying a UTC offset
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

/// Date/time formats without an offset, interpreted as UTC
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Half-open interval `[start, end)` in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: i64,
    pub end: i64,
}

impl Span {
    fn instant(micros: i64) -> Self {
        Self {
            start: micros,
            end: micros + 1,
        }
    }
}

/// Parse a date or date-time into a span of epoch microseconds
pub fn parse_date(text: &str) -> Result<Span, String> {
    let text = text.trim();
    if let Some(ts) = parse_datetime(text) {
        return Ok(Span::instant(ts.timestamp_micros()));
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            let start = date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_micros())
                .ok_or_else(|| "date out of range".to_string())?;
            return Ok(Span {
                start,
                end: start + MICROS_PER_DAY,
            });
        }
    }

    Err("no accepted date format matched".to_string())
}

/// Parse a time of day into a span of microseconds since midnight
///
/// Full date-times are accepted; only their UTC time component is used.
pub fn parse_time(text: &str) -> Result<Span, String> {
    let text = text.trim();
    for format in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(text, format) {
            return Ok(Span::instant(time_to_micros(time)));
        }
    }

    if let Some(ts) = parse_datetime(text) {
        return Ok(Span::instant(ts.timestamp_micros().rem_euclid(MICROS_PER_DAY)));
    }

    Err("no accepted time format matched".to_string())
}

fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc());
        }
    }
    None
}

/// Parse any numeric encoding (JSON integer, float, numeric string)
pub fn parse_number(value: &ScalarValue) -> Result<Number, String> {
    let number = match value {
        ScalarValue::Int(n) => Number::I64(*n),
        ScalarValue::UInt(n) => Number::U64(*n),
        ScalarValue::Float(n) => Number::F64(*n),
        ScalarValue::Text(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<i64>() {
                Number::I64(n)
            } else if let Ok(n) = s.parse::<u64>() {
                Number::U64(n)
            } else {
                Number::F64(s.parse::<f64>().map_err(|e| e.to_string())?)
            }
        }
        ScalarValue::Bool(_) => return Err("expected a number, got a boolean".to_string()),
    };

    match number {
        Number::F64(n) if !n.is_finite() => Err("number must be finite".to_string()),
        n => Ok(n),
    }
}

/// Parse a boolean from `true`/`false`, `1`/`0`, `yes`/`no`
pub fn parse_bool(value: &ScalarValue) -> Result<bool, String> {
    match value {
        ScalarValue::Bool(b) => Ok(*b),
        ScalarValue::Int(1) | ScalarValue::UInt(1) => Ok(true),
        ScalarValue::Int(0) | ScalarValue::UInt(0) => Ok(false),
        ScalarValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(format!("'{}' is not a boolean", other)),
        },
        other => Err(format!("'{}' is not a boolean", other.to_text())),
    }
}
