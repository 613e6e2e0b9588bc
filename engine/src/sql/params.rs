//! Bound query parameters

use crate::semantics::{Number, Operand};

/// A single bound parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Real(f64),
    Bool(bool),
}

impl From<Operand> for SqlParam {
    fn from(operand: Operand) -> Self {
        match operand {
            Operand::Number(Number::I64(n)) => SqlParam::Int(n),
            Operand::Number(Number::U64(n)) => match i64::try_from(n) {
                Ok(n) => SqlParam::Int(n),
                Err(_) => SqlParam::Real(n as f64),
            },
            Operand::Number(Number::F64(n)) => SqlParam::Real(n),
            Operand::Bool(b) => SqlParam::Bool(b),
            Operand::Micros(micros) => SqlParam::Int(micros),
        }
    }
}

/// Collects SQL parameters during query building (maintains insertion order)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlParams {
    pub values: Vec<SqlParam>,
}

impl SqlParams {
    /// Append a value and return its 1-based position
    pub fn push(&mut self, value: impl Into<SqlParam>) -> usize {
        self.values.push(value.into());
        self.values.len()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Escape SQL LIKE metacharacters (%, _, \) in user input
///
/// Use this when building LIKE patterns from user input to prevent
/// unintended pattern matching.
///
/// # Example
///
/// ```
/// use filterkit::sql::escape_like_pattern;
///
/// let user_input = "100% match_test";
/// let pattern = format!("%{}%", escape_like_pattern(user_input));
/// assert_eq!(pattern, "%100\\% match\\_test%");
/// ```
pub fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_pattern_multiple() {
        assert_eq!(escape_like_pattern("100%_\\test"), "100\\%\\_\\\\test");
    }

    #[test]
    fn test_escape_like_pattern_plain() {
        assert_eq!(escape_like_pattern("hello"), "hello");
        assert_eq!(escape_like_pattern(""), "");
    }

    #[test]
    fn test_operand_conversion() {
        assert_eq!(SqlParam::from(Operand::Micros(5)), SqlParam::Int(5));
        assert_eq!(
            SqlParam::from(Operand::Number(Number::U64(7))),
            SqlParam::Int(7)
        );
        assert_eq!(
            SqlParam::from(Operand::Number(Number::U64(u64::MAX))),
            SqlParam::Real(u64::MAX as f64)
        );
        assert_eq!(SqlParam::from(Operand::Bool(true)), SqlParam::Bool(true));
    }

    #[test]
    fn test_push_returns_position() {
        let mut params = SqlParams::default();
        assert_eq!(params.push(SqlParam::Text("a".into())), 1);
        assert_eq!(params.push(Operand::Micros(1)), 2);
        assert_eq!(params.len(), 2);
    }
}
