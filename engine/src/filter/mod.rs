//! Filter specification model
//!
//! Backend-neutral description of a filter request. Filters support text, number,
//! boolean, date and time data types combined by a single AND/OR operator.
//!
//! ## Usage
//!
//! ```no_run
//! use filterkit::filter::parse_specification;
//!
//! let json = r#"{"filters": [{"field": "role", "mode": "equal", "data_type": "text", "value": "admin"}]}"#;
//! let spec = parse_specification(json).unwrap();
//! assert_eq!(spec.filters.len(), 1);
//! ```

mod parser;
mod types;

pub use parser::parse_specification;
pub use types::{
    DataType, FieldFilter, FilterSpecification, FilterValue, Logic, Mode, RangeValue,
    ScalarValue, SortDirection, SortField,
};
