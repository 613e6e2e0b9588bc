//! Comparison semantics shared by every backend
//!
//! Filters compile into a [`Condition`] once; the in-memory evaluator calls
//! [`CompiledCondition::matches`] and the SQL translator renders the same condition.

mod compare;
mod condition;
mod parse;
mod value;

pub use compare::{compare, order, order_directed};
pub use condition::{
    CompareOp, CompiledCondition, Condition, Operand, Projection, TextOp, compile,
    natural_data_type,
};
pub use parse::{Span, parse_bool, parse_date, parse_number, parse_time};
pub use value::{Number, Value, time_to_micros};
