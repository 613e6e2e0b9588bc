//! Declarative record filtering with one semantics for memory and SQL
//!
//! A [`FilterSpecification`] is compiled once against a [`Record`] type's schema and
//! then evaluated either over in-memory records or as a parameterized SQL query. The
//! [`Engine`] facade picks between the two by estimated table size.

pub mod compiler;
pub mod core;
pub mod engine;
pub mod error;
pub mod filter;
pub mod hybrid;
pub mod memory;
pub mod pagination;
pub mod schema;
pub mod semantics;
pub mod sql;

pub use compiler::{CompiledSpec, compile_specification};
pub use core::{EngineConfig, UnknownFieldPolicy, init_logging};
pub use engine::Engine;
pub use error::{FilterError, Result};
pub use filter::{
    DataType, FieldFilter, FilterSpecification, FilterValue, Logic, Mode, RangeValue,
    ScalarValue, SortDirection, SortField, parse_specification,
};
pub use hybrid::{Backend, HybridSelector};
pub use memory::MemoryEvaluator;
pub use pagination::{Page, PageRequest, PaginationResult};
pub use schema::{ColumnKind, Record, RecordSchema, schema_of};
pub use sql::{DialectKind, RelationalExecutor, RowCountEstimator, SqlRecord};
