//! In-process evaluation of compiled conditions and value ordering

use std::cmp::Ordering;

use crate::error::Result;
use crate::filter::{DataType, FieldFilter, FilterValue, Mode, SortDirection};
use crate::schema::ColumnKind;

use super::condition::{CompareOp, CompiledCondition, Condition, Operand, TextOp, compile};
use super::value::{Number, Value};

/// A field value reduced to the representation its data type compares on
#[derive(Debug, Clone, Copy)]
enum Probe<'a> {
    Text(&'a str),
    Number(Number),
    Bool(bool),
    Micros(i64),
}

impl<'a> Probe<'a> {
    /// Values whose variant does not fit the data type are treated as null
    fn of(data_type: DataType, value: &Value<'a>) -> Option<Self> {
        match data_type {
            DataType::Text => value.as_str().map(Probe::Text),
            DataType::Number => value.as_number().map(Probe::Number),
            DataType::Boolean => value.as_bool().map(Probe::Bool),
            DataType::Date => value.timestamp_micros().map(Probe::Micros),
            DataType::Time => value.time_of_day_micros().map(Probe::Micros),
        }
    }

    fn cmp_operand(self, operand: &Operand) -> Option<Ordering> {
        match (self, operand) {
            (Probe::Number(a), Operand::Number(b)) => a.compare(*b),
            (Probe::Bool(a), Operand::Bool(b)) => Some(a.cmp(b)),
            (Probe::Micros(a), Operand::Micros(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    fn total_cmp(self, other: Self) -> Ordering {
        match (self, other) {
            (Probe::Text(a), Probe::Text(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Probe::Number(a), Probe::Number(b)) => a.total_cmp(b),
            (Probe::Bool(a), Probe::Bool(b)) => a.cmp(&b),
            (Probe::Micros(a), Probe::Micros(b)) => a.cmp(&b),
            _ => Ordering::Equal,
        }
    }
}

impl CompiledCondition {
    /// Evaluate the condition against a field value read off a record
    pub fn matches(&self, value: &Value<'_>) -> bool {
        match (&self.condition, Probe::of(self.data_type, value)) {
            (
                Condition::Empty {
                    negated,
                    blank_text,
                },
                _,
            ) => {
                let empty = match value {
                    Value::Null => true,
                    Value::Text(s) => *blank_text && s.is_empty(),
                    _ => false,
                };
                empty != *negated
            }
            (condition, None) => condition.matches_null(),
            (
                Condition::Text {
                    op,
                    needle,
                    negated,
                },
                Some(probe),
            ) => {
                let Probe::Text(text) = probe else {
                    return *negated;
                };
                let haystack = text.to_ascii_lowercase();
                let hit = match op {
                    TextOp::Equals => haystack == *needle,
                    TextOp::Contains => haystack.contains(needle.as_str()),
                    TextOp::StartsWith => haystack.starts_with(needle.as_str()),
                    TextOp::EndsWith => haystack.ends_with(needle.as_str()),
                };
                hit != *negated
            }
            (Condition::Compare { op, operand }, Some(probe)) => {
                match probe.cmp_operand(operand) {
                    Some(ordering) => match op {
                        CompareOp::Eq => ordering == Ordering::Equal,
                        CompareOp::Ne => ordering != Ordering::Equal,
                        CompareOp::Gt => ordering == Ordering::Greater,
                        CompareOp::Gte => ordering != Ordering::Less,
                        CompareOp::Lt => ordering == Ordering::Less,
                        CompareOp::Lte => ordering != Ordering::Greater,
                    },
                    None => *op == CompareOp::Ne,
                }
            }
            (
                Condition::Within {
                    lower,
                    upper,
                    upper_inclusive,
                    negated,
                },
                Some(probe),
            ) => {
                let above = matches!(
                    probe.cmp_operand(lower),
                    Some(Ordering::Greater | Ordering::Equal)
                );
                let below = match probe.cmp_operand(upper) {
                    Some(Ordering::Less) => true,
                    Some(Ordering::Equal) => *upper_inclusive,
                    _ => false,
                };
                (above && below) != *negated
            }
        }
    }
}

/// Column kind a data type is stored as when no schema is at hand
fn default_kind(data_type: DataType) -> ColumnKind {
    match data_type {
        DataType::Text => ColumnKind::Text,
        DataType::Number => ColumnKind::Real,
        DataType::Boolean => ColumnKind::Boolean,
        DataType::Date => ColumnKind::Timestamp,
        DataType::Time => ColumnKind::TimeOfDay,
    }
}

/// Evaluate one mode against a single value
///
/// Convenience entry point over [`compile`] + [`CompiledCondition::matches`]; engines
/// evaluating many records should compile once instead.
///
/// ```
/// use filterkit::filter::{DataType, FilterValue, Mode};
/// use filterkit::semantics::{Value, compare};
///
/// let needle = FilterValue::Scalar("ADMIN".into());
/// assert!(compare(DataType::Text, Mode::Equal, &Value::Text("admin"), Some(&needle)).unwrap());
/// assert!(!compare(DataType::Text, Mode::Equal, &Value::Null, Some(&needle)).unwrap());
/// ```
pub fn compare(
    data_type: DataType,
    mode: Mode,
    field_value: &Value<'_>,
    filter_value: Option<&FilterValue>,
) -> Result<bool> {
    let filter = FieldFilter {
        field: "value".to_string(),
        mode,
        data_type,
        value: filter_value.cloned(),
    };
    let compiled = compile(&filter, default_kind(data_type))?;
    Ok(compiled.matches(field_value))
}

/// Ascending order of two values with nulls last
///
/// Text compares byte-wise, numbers by value, `false < true`, dates by instant and
/// times by time of day.
pub fn order(data_type: DataType, a: &Value<'_>, b: &Value<'_>) -> Ordering {
    order_directed(data_type, SortDirection::Asc, a, b)
}

/// Order two values in a sort direction; nulls sort last in both directions
pub fn order_directed(
    data_type: DataType,
    direction: SortDirection,
    a: &Value<'_>,
    b: &Value<'_>,
) -> Ordering {
    match (Probe::of(data_type, a), Probe::of(data_type, b)) {
        (Some(a), Some(b)) => direction.apply(a.total_cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
