//! Runtime value types read off records.
//!
//! The [`Value`] enum is what a [`crate::schema::Record`] returns for a field. Text is
//! borrowed from the record; everything else is copied.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveTime, Timelike, Utc};

use crate::core::constants::MICROS_PER_DAY;

/// Runtime value of a field, borrowed from the source record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Text(&'a str),
    Number(Number),
    Bool(bool),
    /// Instant in UTC; compared at microsecond precision.
    Timestamp(DateTime<Utc>),
    /// Time of day; compared at microsecond precision.
    Time(NaiveTime),
    /// Field absent, null, or relation not loaded.
    Null,
}

impl<'a> Value<'a> {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Microseconds since the Unix epoch for timestamps.
    pub fn timestamp_micros(&self) -> Option<i64> {
        match self {
            Value::Timestamp(ts) => Some(ts.timestamp_micros()),
            _ => None,
        }
    }

    /// Microseconds since midnight for times, or the UTC time of day of a timestamp.
    pub fn time_of_day_micros(&self) -> Option<i64> {
        match self {
            Value::Time(t) => Some(time_to_micros(*t)),
            Value::Timestamp(ts) => Some(ts.timestamp_micros().rem_euclid(MICROS_PER_DAY)),
            _ => None,
        }
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::Text(s)
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(s: &'a String) -> Self {
        Value::Text(s)
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value<'_> {
    fn from(n: i64) -> Self {
        Value::Number(Number::I64(n))
    }
}

impl From<f64> for Value<'_> {
    fn from(n: f64) -> Self {
        Value::Number(Number::F64(n))
    }
}

impl From<DateTime<Utc>> for Value<'_> {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<NaiveTime> for Value<'_> {
    fn from(t: NaiveTime) -> Self {
        Value::Time(t)
    }
}

/// Microseconds since midnight, with leap-second nanos clamped into the same second
pub fn time_to_micros(t: NaiveTime) -> i64 {
    let sub_micros = (t.nanosecond().min(999_999_999) / 1_000) as i64;
    t.num_seconds_from_midnight() as i64 * 1_000_000 + sub_micros
}

/// Numeric value supporting all common numeric encodings.
///
/// Comparisons between different variants convert to `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl Number {
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers by value, handling mixed types.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            (Number::I64(a), Number::U64(b)) => Some(compare_signed_unsigned(a, b)),
            (Number::U64(a), Number::I64(b)) => Some(compare_signed_unsigned(b, a).reverse()),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    /// Total order used for sorting; NaN sorts after every other number.
    pub fn total_cmp(self, other: Number) -> Ordering {
        self.compare(other)
            .unwrap_or_else(|| self.to_f64().total_cmp(&other.to_f64()))
    }
}

fn compare_signed_unsigned(a: i64, b: u64) -> Ordering {
    if a < 0 {
        Ordering::Less
    } else {
        (a as u64).cmp(&b)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::U64(n as u64)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::U64(n)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::F64(n)
    }
}
