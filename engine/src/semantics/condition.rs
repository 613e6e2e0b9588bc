//! Filter compilation
//!
//! [`compile`] is the single place where a (data type, mode, value) triple becomes a
//! backend-neutral [`Condition`]. The in-memory evaluator and the SQL translator both
//! interpret the result, so the two backends cannot drift apart.

use crate::error::{FilterError, Result};
use crate::filter::{DataType, FieldFilter, FilterValue, Mode, RangeValue, ScalarValue};
use crate::schema::ColumnKind;

use super::parse::{Span, parse_bool, parse_date, parse_number, parse_time};
use super::value::Number;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOp {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }
}

/// Parsed comparison operand
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Number(Number),
    Bool(bool),
    /// Epoch microseconds for dates, microseconds since midnight for times
    Micros(i64),
}

/// How the stored column is read before comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Identity,
    /// UTC time of day of a timestamp column
    TimeOfDay,
}

/// Backend-neutral predicate over a single field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Text match folding ASCII case only, as SQL `LOWER` does; `needle` is pre-folded
    Text {
        op: TextOp,
        needle: String,
        negated: bool,
    },
    /// Null check; `blank_text` also treats zero-length text as empty
    Empty { negated: bool, blank_text: bool },
    Compare { op: CompareOp, operand: Operand },
    /// `lower <= v < upper`, or `<= upper` when `upper_inclusive`
    Within {
        lower: Operand,
        upper: Operand,
        upper_inclusive: bool,
        negated: bool,
    },
}

impl Condition {
    /// Result of this condition for a null field value
    ///
    /// Negated conditions pass on null, everything else fails, except is-empty.
    pub fn matches_null(&self) -> bool {
        match self {
            Condition::Text { negated, .. } | Condition::Within { negated, .. } => *negated,
            Condition::Empty { negated, .. } => !negated,
            Condition::Compare { op, .. } => *op == CompareOp::Ne,
        }
    }
}

/// A filter compiled against the storage kind of its column
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCondition {
    pub data_type: DataType,
    pub projection: Projection,
    pub condition: Condition,
}

/// Data type that compares a column kind natively (used for sorting)
pub fn natural_data_type(kind: ColumnKind) -> DataType {
    match kind {
        ColumnKind::Text => DataType::Text,
        ColumnKind::Integer | ColumnKind::Real => DataType::Number,
        ColumnKind::Boolean => DataType::Boolean,
        ColumnKind::Timestamp => DataType::Date,
        ColumnKind::TimeOfDay => DataType::Time,
    }
}

fn projection_for(data_type: DataType, kind: ColumnKind) -> Option<Projection> {
    match (data_type, kind) {
        (DataType::Text, ColumnKind::Text)
        | (DataType::Number, ColumnKind::Integer | ColumnKind::Real)
        | (DataType::Boolean, ColumnKind::Boolean)
        | (DataType::Date, ColumnKind::Timestamp)
        | (DataType::Time, ColumnKind::TimeOfDay) => Some(Projection::Identity),
        (DataType::Time, ColumnKind::Timestamp) => Some(Projection::TimeOfDay),
        _ => None,
    }
}

/// Compile a filter against the storage kind of its resolved column
pub fn compile(filter: &FieldFilter, kind: ColumnKind) -> Result<CompiledCondition> {
    let field = filter.field.as_str();
    let (mode, data_type) = (filter.mode, filter.data_type);

    if !mode.supports(data_type) {
        return Err(FilterError::unsupported_mode(field, mode, data_type));
    }
    let projection = projection_for(data_type, kind).ok_or_else(|| FilterError::TypeMismatch {
        field: field.to_string(),
        data_type,
        kind,
    })?;

    let condition = if mode.is_nullary() {
        Condition::Empty {
            negated: mode == Mode::IsNotEmpty,
            blank_text: data_type == DataType::Text,
        }
    } else {
        let value = filter
            .value
            .as_ref()
            .ok_or_else(|| FilterError::invalid_value(field, mode, "a value is required"))?;
        match data_type {
            DataType::Text => compile_text(field, mode, scalar(field, mode, value)?)?,
            DataType::Number => compile_number(field, mode, value)?,
            DataType::Boolean => compile_bool(field, mode, scalar(field, mode, value)?)?,
            DataType::Date | DataType::Time => compile_temporal(field, mode, data_type, value)?,
        }
    };

    Ok(CompiledCondition {
        data_type,
        projection,
        condition,
    })
}

fn scalar<'v>(field: &str, mode: Mode, value: &'v FilterValue) -> Result<&'v ScalarValue> {
    match value {
        FilterValue::Scalar(v) => Ok(v),
        FilterValue::Range(_) => Err(FilterError::invalid_value(
            field,
            mode,
            "expected a single value, got a range",
        )),
    }
}

fn range<'v>(field: &str, value: &'v FilterValue) -> Result<&'v RangeValue> {
    match value {
        FilterValue::Range(r) => Ok(r),
        FilterValue::Scalar(_) => Err(FilterError::invalid_value(
            field,
            Mode::Range,
            "expected an object with 'from' and 'to'",
        )),
    }
}

fn compile_text(field: &str, mode: Mode, value: &ScalarValue) -> Result<Condition> {
    let needle = value.to_text().to_ascii_lowercase();
    let (op, negated) = match mode {
        Mode::Equal => (TextOp::Equals, false),
        Mode::NotEqual => (TextOp::Equals, true),
        Mode::Contains => (TextOp::Contains, false),
        Mode::NotContains => (TextOp::Contains, true),
        Mode::StartsWith => (TextOp::StartsWith, false),
        Mode::EndsWith => (TextOp::EndsWith, false),
        other => return Err(FilterError::unsupported_mode(field, other, DataType::Text)),
    };
    Ok(Condition::Text {
        op,
        needle,
        negated,
    })
}

fn number(field: &str, value: &ScalarValue) -> Result<Number> {
    parse_number(value)
        .map_err(|reason| FilterError::parse(field, DataType::Number, value.to_text(), reason))
}

fn compile_number(field: &str, mode: Mode, value: &FilterValue) -> Result<Condition> {
    if mode == Mode::Range {
        let range = range(field, value)?;
        let (from, to) = (number(field, &range.from)?, number(field, &range.to)?);
        if from.compare(to) == Some(std::cmp::Ordering::Greater) {
            return Err(FilterError::InvalidRange {
                field: field.to_string(),
                from: range.from.to_text(),
                to: range.to.to_text(),
            });
        }
        return Ok(Condition::Within {
            lower: Operand::Number(from),
            upper: Operand::Number(to),
            upper_inclusive: true,
            negated: false,
        });
    }

    let operand = Operand::Number(number(field, scalar(field, mode, value)?)?);
    let op = match mode {
        Mode::Equal => CompareOp::Eq,
        Mode::NotEqual => CompareOp::Ne,
        Mode::GreaterThan => CompareOp::Gt,
        Mode::GreaterOrEqual => CompareOp::Gte,
        Mode::LessThan => CompareOp::Lt,
        Mode::LessOrEqual => CompareOp::Lte,
        other => return Err(FilterError::unsupported_mode(field, other, DataType::Number)),
    };
    Ok(Condition::Compare { op, operand })
}

fn compile_bool(field: &str, mode: Mode, value: &ScalarValue) -> Result<Condition> {
    let flag = parse_bool(value)
        .map_err(|reason| FilterError::parse(field, DataType::Boolean, value.to_text(), reason))?;
    let op = if mode == Mode::NotEqual {
        CompareOp::Ne
    } else {
        CompareOp::Eq
    };
    Ok(Condition::Compare {
        op,
        operand: Operand::Bool(flag),
    })
}

fn span(field: &str, data_type: DataType, value: &ScalarValue) -> Result<Span> {
    let ScalarValue::Text(text) = value else {
        return Err(FilterError::parse(
            field,
            data_type,
            value.to_text(),
            "expected a string",
        ));
    };
    let parsed = if data_type == DataType::Time {
        parse_time(text)
    } else {
        parse_date(text)
    };
    parsed.map_err(|reason| FilterError::parse(field, data_type, text.as_str(), reason))
}

fn compile_temporal(
    field: &str,
    mode: Mode,
    data_type: DataType,
    value: &FilterValue,
) -> Result<Condition> {
    if mode == Mode::Range {
        let range = range(field, value)?;
        let from = span(field, data_type, &range.from)?;
        let to = span(field, data_type, &range.to)?;
        if from.start >= to.end {
            return Err(FilterError::InvalidRange {
                field: field.to_string(),
                from: range.from.to_text(),
                to: range.to.to_text(),
            });
        }
        return Ok(within(from.start, to.end, false));
    }

    let span = span(field, data_type, scalar(field, mode, value)?)?;
    let compare = |op, micros| Condition::Compare {
        op,
        operand: Operand::Micros(micros),
    };
    Ok(match mode {
        Mode::Equal => within(span.start, span.end, false),
        Mode::NotEqual => within(span.start, span.end, true),
        Mode::Before | Mode::LessThan => compare(CompareOp::Lt, span.start),
        Mode::After | Mode::GreaterThan => compare(CompareOp::Gte, span.end),
        Mode::GreaterOrEqual => compare(CompareOp::Gte, span.start),
        Mode::LessOrEqual => compare(CompareOp::Lt, span.end),
        other => return Err(FilterError::unsupported_mode(field, other, data_type)),
    })
}

fn within(start: i64, end: i64, negated: bool) -> Condition {
    Condition::Within {
        lower: Operand::Micros(start),
        upper: Operand::Micros(end),
        upper_inclusive: false,
        negated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::MICROS_PER_DAY;

    fn day_start(date: &str) -> i64 {
        parse_date(date).unwrap().start
    }

    #[test]
    fn text_modes_lowercase_the_needle() {
        let filter = FieldFilter::new("role", Mode::NotContains, DataType::Text, "ADMIN");
        let compiled = compile(&filter, ColumnKind::Text).unwrap();
        assert_eq!(
            compiled.condition,
            Condition::Text {
                op: TextOp::Contains,
                needle: "admin".into(),
                negated: true
            }
        );
        assert_eq!(compiled.projection, Projection::Identity);
    }

    #[test]
    fn needle_folds_ascii_case_only() {
        let filter = FieldFilter::new("name", Mode::Equal, DataType::Text, "ÉVA");
        let compiled = compile(&filter, ColumnKind::Text).unwrap();
        assert!(matches!(
            compiled.condition,
            Condition::Text { ref needle, .. } if needle == "Éva"
        ));
    }

    #[test]
    fn empty_modes_need_no_value() {
        let filter = FieldFilter::nullary("nickname", Mode::IsEmpty, DataType::Text);
        let compiled = compile(&filter, ColumnKind::Text).unwrap();
        assert_eq!(
            compiled.condition,
            Condition::Empty {
                negated: false,
                blank_text: true
            }
        );

        let filter = FieldFilter::nullary("age", Mode::IsNotEmpty, DataType::Number);
        let compiled = compile(&filter, ColumnKind::Integer).unwrap();
        assert_eq!(
            compiled.condition,
            Condition::Empty {
                negated: true,
                blank_text: false
            }
        );
    }

    #[test]
    fn number_range_is_inclusive_and_validated() {
        let filter = FieldFilter::range("age", DataType::Number, 18, "65");
        let compiled = compile(&filter, ColumnKind::Integer).unwrap();
        assert_eq!(
            compiled.condition,
            Condition::Within {
                lower: Operand::Number(Number::I64(18)),
                upper: Operand::Number(Number::I64(65)),
                upper_inclusive: true,
                negated: false
            }
        );

        let filter = FieldFilter::range("age", DataType::Number, 65, 18);
        let err = compile(&filter, ColumnKind::Integer).unwrap_err();
        assert!(matches!(err, FilterError::InvalidRange { .. }));

        let filter = FieldFilter::range("age", DataType::Number, 5, 5);
        assert!(compile(&filter, ColumnKind::Real).is_ok());
    }

    #[test]
    fn date_modes_follow_day_spans() {
        let start = day_start("2024-02-01");
        let end = start + MICROS_PER_DAY;
        let cases = [
            (Mode::Before, CompareOp::Lt, start),
            (Mode::LessThan, CompareOp::Lt, start),
            (Mode::After, CompareOp::Gte, end),
            (Mode::GreaterThan, CompareOp::Gte, end),
            (Mode::GreaterOrEqual, CompareOp::Gte, start),
            (Mode::LessOrEqual, CompareOp::Lt, end),
        ];
        for (mode, op, micros) in cases {
            let filter = FieldFilter::new("created_at", mode, DataType::Date, "2024-02-01");
            let compiled = compile(&filter, ColumnKind::Timestamp).unwrap();
            assert_eq!(
                compiled.condition,
                Condition::Compare {
                    op,
                    operand: Operand::Micros(micros)
                },
                "mode {mode}"
            );
        }

        let filter = FieldFilter::new("created_at", Mode::NotEqual, DataType::Date, "2024-02-01");
        let compiled = compile(&filter, ColumnKind::Timestamp).unwrap();
        assert_eq!(compiled.condition, within(start, end, true));
    }

    #[test]
    fn date_range_covers_whole_end_day() {
        let filter = FieldFilter::range("created_at", DataType::Date, "2024-02-01", "2024-02-28");
        let compiled = compile(&filter, ColumnKind::Timestamp).unwrap();
        assert_eq!(
            compiled.condition,
            within(day_start("2024-02-01"), day_start("2024-02-29"), false)
        );
    }

    #[test]
    fn date_range_from_after_to_fails() {
        let filter = FieldFilter::range("created_at", DataType::Date, "2024-03-01", "2024-02-01");
        let err = compile(&filter, ColumnKind::Timestamp).unwrap_err();
        assert!(matches!(err, FilterError::InvalidRange { .. }));
        assert!(err.is_validation());
    }

    #[test]
    fn single_day_range_is_valid() {
        let filter = FieldFilter::range("created_at", DataType::Date, "2024-02-01", "2024-02-01");
        assert!(compile(&filter, ColumnKind::Timestamp).is_ok());
    }

    #[test]
    fn time_on_timestamp_column_projects_time_of_day() {
        let filter = FieldFilter::new("created_at", Mode::After, DataType::Time, "12:00");
        let compiled = compile(&filter, ColumnKind::Timestamp).unwrap();
        assert_eq!(compiled.projection, Projection::TimeOfDay);

        let compiled = compile(&filter, ColumnKind::TimeOfDay).unwrap();
        assert_eq!(compiled.projection, Projection::Identity);
    }

    #[test]
    fn booleans_parse_loosely() {
        let filter = FieldFilter::new("active", Mode::NotEqual, DataType::Boolean, "true");
        let compiled = compile(&filter, ColumnKind::Boolean).unwrap();
        assert_eq!(
            compiled.condition,
            Condition::Compare {
                op: CompareOp::Ne,
                operand: Operand::Bool(true)
            }
        );
    }

    #[test]
    fn validation_errors() {
        let filter = FieldFilter::new("active", Mode::Contains, DataType::Boolean, true);
        assert!(matches!(
            compile(&filter, ColumnKind::Boolean),
            Err(FilterError::UnsupportedMode { .. })
        ));

        let filter = FieldFilter::new("name", Mode::Equal, DataType::Number, 3);
        assert!(matches!(
            compile(&filter, ColumnKind::Text),
            Err(FilterError::TypeMismatch { .. })
        ));

        let filter = FieldFilter::new("created_at", Mode::Equal, DataType::Date, "someday");
        assert!(matches!(
            compile(&filter, ColumnKind::Timestamp),
            Err(FilterError::Parse { .. })
        ));

        let filter = FieldFilter::nullary("age", Mode::Equal, DataType::Number);
        assert!(matches!(
            compile(&filter, ColumnKind::Integer),
            Err(FilterError::InvalidValue { .. })
        ));

        let mut filter = FieldFilter::range("age", DataType::Number, 1, 2);
        filter.mode = Mode::Equal;
        assert!(matches!(
            compile(&filter, ColumnKind::Integer),
            Err(FilterError::InvalidValue { .. })
        ));

        let mut filter = FieldFilter::new("age", Mode::Equal, DataType::Number, 2);
        filter.mode = Mode::Range;
        assert!(matches!(
            compile(&filter, ColumnKind::Integer),
            Err(FilterError::InvalidValue { .. })
        ));
    }

    #[test]
    fn null_semantics_table() {
        let negated_text = Condition::Text {
            op: TextOp::Equals,
            needle: "x".into(),
            negated: true,
        };
        assert!(negated_text.matches_null());
        assert!(
            Condition::Empty {
                negated: false,
                blank_text: false
            }
            .matches_null()
        );
        assert!(
            !Condition::Empty {
                negated: true,
                blank_text: true
            }
            .matches_null()
        );
        assert!(
            Condition::Compare {
                op: CompareOp::Ne,
                operand: Operand::Bool(true)
            }
            .matches_null()
        );
        assert!(
            !Condition::Compare {
                op: CompareOp::Gt,
                operand: Operand::Micros(0)
            }
            .matches_null()
        );
        assert!(within(0, 1, true).matches_null());
        assert!(!within(0, 1, false).matches_null());
    }
}
