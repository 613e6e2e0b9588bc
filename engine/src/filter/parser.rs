//! Filter specification parsing
//!
//! Parses JSON filter specifications with size and count limits.

use crate::core::constants::{MAX_FILTERS, MAX_SPEC_JSON_SIZE};
use crate::error::{FilterError, Result};

use super::types::FilterSpecification;

/// Parse a filter specification from JSON
///
/// Validates document size and filter count. Field paths are not checked here;
/// they are resolved against the record schema at compile time.
pub fn parse_specification(json_str: &str) -> Result<FilterSpecification> {
    if json_str.len() > MAX_SPEC_JSON_SIZE {
        return Err(FilterError::InvalidSpec(format!(
            "document exceeds maximum size of {} bytes",
            MAX_SPEC_JSON_SIZE
        )));
    }

    let spec: FilterSpecification =
        serde_json::from_str(json_str).map_err(|e| FilterError::InvalidSpec(e.to_string()))?;

    if spec.filters.len() > MAX_FILTERS {
        return Err(FilterError::InvalidSpec(format!(
            "maximum {} filters allowed",
            MAX_FILTERS
        )));
    }

    if spec.filters.iter().any(|f| f.field.trim().is_empty())
        || spec.sort.iter().any(|s| s.field.trim().is_empty())
    {
        return Err(FilterError::InvalidSpec("field path must not be empty".into()));
    }

    Ok(spec)
}
