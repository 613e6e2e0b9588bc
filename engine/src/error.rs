//! Unified error type for filter compilation and execution
//!
//! Validation failures (bad ranges, unparseable values, unsupported modes) are fatal
//! and reported to the caller. Database errors are surfaced unmodified.

use thiserror::Error;

use crate::filter::{DataType, Mode};
use crate::schema::ColumnKind;

/// Errors produced while compiling or executing a filter specification
#[derive(Error, Debug)]
pub enum FilterError {
    /// Range whose lower bound is strictly after its upper bound
    #[error("Invalid range on '{field}': from ({from}) is after to ({to})")]
    InvalidRange {
        field: String,
        from: String,
        to: String,
    },

    /// Filter value could not be parsed for its data type
    #[error("Cannot parse {data_type} value '{value}' for '{field}': {reason}")]
    Parse {
        field: String,
        data_type: DataType,
        value: String,
        reason: String,
    },

    /// Mode is not defined for the data type
    #[error("Mode '{mode}' is not supported for {data_type} filters on '{field}'")]
    UnsupportedMode {
        field: String,
        mode: Mode,
        data_type: DataType,
    },

    /// Data type cannot be applied to the column's storage kind
    #[error("Cannot apply {data_type} filter to {kind} field '{field}'")]
    TypeMismatch {
        field: String,
        data_type: DataType,
        kind: ColumnKind,
    },

    /// Value shape does not match the mode (missing value, range for scalar mode, ...)
    #[error("Invalid value for '{field}' ({mode}): {reason}")]
    InvalidValue {
        field: String,
        mode: Mode,
        reason: String,
    },

    /// Field path does not resolve against the record schema (strict mode only)
    #[error("Unknown field '{path}' on {record}")]
    UnknownField { record: &'static str, path: String },

    /// Field path has more segments than allowed (strict mode only)
    #[error("Field '{path}' exceeds maximum relation depth of {max_depth}")]
    FieldTooDeep { path: String, max_depth: usize },

    /// Malformed filter specification document
    #[error("Invalid filter specification: {0}")]
    InvalidSpec(String),

    /// Row count estimation failed (recovered by the hybrid selector)
    #[error("Row count estimation failed for {table}: {reason}")]
    Estimate { table: String, reason: String },

    /// Relational backend error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Background evaluation task failed
    #[error("Evaluation worker failed: {0}")]
    Worker(String),
}

impl FilterError {
    pub fn parse(
        field: &str,
        data_type: DataType,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Parse {
            field: field.to_string(),
            data_type,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_value(field: &str, mode: Mode, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            mode,
            reason: reason.into(),
        }
    }

    pub fn unsupported_mode(field: &str, mode: Mode, data_type: DataType) -> Self {
        Self::UnsupportedMode {
            field: field.to_string(),
            mode,
            data_type,
        }
    }

    pub fn estimate(table: &str, reason: impl Into<String>) -> Self {
        Self::Estimate {
            table: table.to_string(),
            reason: reason.into(),
        }
    }

    /// Check if this error was caused by the request itself rather than the backend
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange { .. }
                | Self::Parse { .. }
                | Self::UnsupportedMode { .. }
                | Self::TypeMismatch { .. }
                | Self::InvalidValue { .. }
                | Self::UnknownField { .. }
                | Self::FieldTooDeep { .. }
                | Self::InvalidSpec(_)
        )
    }
}

/// Result type for filter operations
pub type Result<T> = std::result::Result<T, FilterError>;
