//! Filter specification types
//!
//! A [`FilterSpecification`] is a flat list of [`FieldFilter`]s joined by a single
//! [`Logic`] operator, plus sort keys and relations to eagerly load. All types
//! deserialize from the JSON shape accepted by [`super::parse_specification`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the filter list combines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Logic {
    #[default]
    #[serde(alias = "AND")]
    And,
    #[serde(alias = "OR")]
    Or,
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::And => write!(f, "and"),
            Logic::Or => write!(f, "or"),
        }
    }
}

/// Comparison operator applied within a [`FieldFilter`]
///
/// Not every mode is valid for every [`DataType`]; see [`Mode::supports`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[serde(alias = "eq")]
    Equal,
    #[serde(alias = "not_equal", alias = "ne")]
    NotEqual,
    Contains,
    #[serde(alias = "not_contains")]
    NotContains,
    #[serde(alias = "starts_with")]
    StartsWith,
    #[serde(alias = "ends_with")]
    EndsWith,
    #[serde(alias = "is_empty")]
    IsEmpty,
    #[serde(alias = "is_not_empty")]
    IsNotEmpty,
    #[serde(alias = "greater_than", alias = "gt")]
    GreaterThan,
    #[serde(alias = "greater_or_equal", alias = "gte")]
    GreaterOrEqual,
    #[serde(alias = "less_than", alias = "lt")]
    LessThan,
    #[serde(alias = "less_or_equal", alias = "lte")]
    LessOrEqual,
    Range,
    Before,
    After,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Equal => "equal",
            Mode::NotEqual => "not-equal",
            Mode::Contains => "contains",
            Mode::NotContains => "not-contains",
            Mode::StartsWith => "starts-with",
            Mode::EndsWith => "ends-with",
            Mode::IsEmpty => "is-empty",
            Mode::IsNotEmpty => "is-not-empty",
            Mode::GreaterThan => "greater-than",
            Mode::GreaterOrEqual => "greater-or-equal",
            Mode::LessThan => "less-than",
            Mode::LessOrEqual => "less-or-equal",
            Mode::Range => "range",
            Mode::Before => "before",
            Mode::After => "after",
        }
    }

    /// Returns `true` if this mode takes no value
    pub fn is_nullary(self) -> bool {
        matches!(self, Mode::IsEmpty | Mode::IsNotEmpty)
    }

    /// Returns `true` if this mode is defined for the given data type
    pub fn supports(self, data_type: DataType) -> bool {
        match data_type {
            DataType::Text => matches!(
                self,
                Mode::Equal
                    | Mode::NotEqual
                    | Mode::Contains
                    | Mode::NotContains
                    | Mode::StartsWith
                    | Mode::EndsWith
                    | Mode::IsEmpty
                    | Mode::IsNotEmpty
            ),
            DataType::Number => matches!(
                self,
                Mode::Equal
                    | Mode::NotEqual
                    | Mode::GreaterThan
                    | Mode::GreaterOrEqual
                    | Mode::LessThan
                    | Mode::LessOrEqual
                    | Mode::Range
                    | Mode::IsEmpty
                    | Mode::IsNotEmpty
            ),
            DataType::Boolean => matches!(
                self,
                Mode::Equal | Mode::NotEqual | Mode::IsEmpty | Mode::IsNotEmpty
            ),
            DataType::Date | DataType::Time => matches!(
                self,
                Mode::Equal
                    | Mode::NotEqual
                    | Mode::GreaterThan
                    | Mode::GreaterOrEqual
                    | Mode::LessThan
                    | Mode::LessOrEqual
                    | Mode::Range
                    | Mode::Before
                    | Mode::After
                    | Mode::IsEmpty
                    | Mode::IsNotEmpty
            ),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Semantic type governing parsing and comparison, independent of storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[serde(alias = "string")]
    Text,
    Number,
    #[serde(alias = "bool")]
    Boolean,
    #[serde(alias = "datetime")]
    Date,
    Time,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
            DataType::Time => "time",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single scalar filter operand, as supplied by the caller
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl ScalarValue {
    /// Textual form used for parsing and error messages
    pub fn to_text(&self) -> String {
        match self {
            ScalarValue::Bool(b) => b.to_string(),
            ScalarValue::Int(n) => n.to_string(),
            ScalarValue::UInt(n) => n.to_string(),
            ScalarValue::Float(n) => n.to_string(),
            ScalarValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::Text(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::Text(s)
    }
}

impl From<i64> for ScalarValue {
    fn from(n: i64) -> Self {
        ScalarValue::Int(n)
    }
}

impl From<i32> for ScalarValue {
    fn from(n: i32) -> Self {
        ScalarValue::Int(n as i64)
    }
}

impl From<f64> for ScalarValue {
    fn from(n: f64) -> Self {
        ScalarValue::Float(n)
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        ScalarValue::Bool(b)
    }
}

/// Inclusive `from`/`to` pair for [`Mode::Range`]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RangeValue {
    pub from: ScalarValue,
    pub to: ScalarValue,
}

/// Filter operand: a scalar, or a range for [`Mode::Range`]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Range(RangeValue),
    Scalar(ScalarValue),
}

/// One atomic condition within a [`FilterSpecification`]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FieldFilter {
    /// Dotted path of external field names, e.g. `currency.currency_code`
    pub field: String,
    pub mode: Mode,
    #[serde(alias = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub value: Option<FilterValue>,
}

impl FieldFilter {
    pub fn new(
        field: impl Into<String>,
        mode: Mode,
        data_type: DataType,
        value: impl Into<ScalarValue>,
    ) -> Self {
        Self {
            field: field.into(),
            mode,
            data_type,
            value: Some(FilterValue::Scalar(value.into())),
        }
    }

    /// Filter for a mode that takes no value (is-empty, is-not-empty)
    pub fn nullary(field: impl Into<String>, mode: Mode, data_type: DataType) -> Self {
        Self {
            field: field.into(),
            mode,
            data_type,
            value: None,
        }
    }

    pub fn range(
        field: impl Into<String>,
        data_type: DataType,
        from: impl Into<ScalarValue>,
        to: impl Into<ScalarValue>,
    ) -> Self {
        Self {
            field: field.into(),
            mode: Mode::Range,
            data_type,
            value: Some(FilterValue::Range(RangeValue {
                from: from.into(),
                to: to.into(),
            })),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

impl SortDirection {
    pub fn is_desc(self) -> bool {
        matches!(self, SortDirection::Desc)
    }

    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// A sort key: field path plus direction
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SortField {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortField {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Declarative, backend-neutral filter request
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FilterSpecification {
    #[serde(default)]
    pub logic: Logic,
    #[serde(default)]
    pub filters: Vec<FieldFilter>,
    #[serde(default)]
    pub sort: Vec<SortField>,
    /// Relation paths to eagerly load alongside each record
    #[serde(default)]
    pub preload: Vec<String>,
}

impl FilterSpecification {
    /// Creates an empty specification that matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logic(mut self, logic: Logic) -> Self {
        self.logic = logic;
        self
    }

    pub fn filter(mut self, filter: FieldFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sort_by(mut self, sort: SortField) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn preload(mut self, relation: impl Into<String>) -> Self {
        self.preload.push(relation.into());
        self
    }
}
