//! Record schemas and field path resolution

mod record;
mod registry;
mod resolver;

pub use record::{ColumnKind, FieldDef, Record, RecordSchema, RelationDef};
pub use registry::schema_of;
pub use resolver::{ColumnRef, FieldResolver, JoinSpec, ResolvedField, projection_alias};
