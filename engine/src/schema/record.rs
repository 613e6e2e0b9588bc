//! Record type declarations
//!
//! A [`Record`] describes itself once through [`Record::describe`] and exposes its
//! fields and to-one relations by external (serialized) name. The engine never looks
//! at struct internals.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::semantics::Value;

use super::registry::schema_of;

/// Storage representation of a field, shared by both backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Integer,
    Real,
    Boolean,
    /// Microseconds since the Unix epoch, UTC
    Timestamp,
    /// Microseconds since midnight
    TimeOfDay,
}

impl ColumnKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Integer => "integer",
            ColumnKind::Real => "real",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Timestamp => "timestamp",
            ColumnKind::TimeOfDay => "time_of_day",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A queryable scalar field
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// External name matched by field paths
    pub name: &'static str,
    pub column: &'static str,
    pub kind: ColumnKind,
}

/// A to-one relation to another record type
#[derive(Debug, Clone)]
pub struct RelationDef {
    /// External name matched by field paths
    pub name: &'static str,
    /// Column on the owning table holding the foreign key
    pub local_column: &'static str,
    /// Column on the target table referenced by the foreign key
    pub foreign_column: &'static str,
    target: fn() -> Arc<RecordSchema>,
}

impl RelationDef {
    pub fn target(&self) -> Arc<RecordSchema> {
        (self.target)()
    }
}

/// Immutable description of a record type
#[derive(Debug, Clone)]
pub struct RecordSchema {
    name: &'static str,
    table: &'static str,
    primary_key: Option<&'static str>,
    fields: Vec<FieldDef>,
    relations: Vec<RelationDef>,
}

impl RecordSchema {
    pub fn new(name: &'static str, table: &'static str) -> Self {
        Self {
            name,
            table,
            primary_key: None,
            fields: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Mark a declared field as the primary key (used as the final sort tie-break)
    pub fn primary_key(mut self, field: &'static str) -> Self {
        self.primary_key = Some(field);
        self
    }

    pub fn field(mut self, name: &'static str, column: &'static str, kind: ColumnKind) -> Self {
        self.fields.push(FieldDef { name, column, kind });
        self
    }

    pub fn relation<T: Record>(
        mut self,
        name: &'static str,
        local_column: &'static str,
        foreign_column: &'static str,
    ) -> Self {
        self.relations.push(RelationDef {
            name,
            local_column,
            foreign_column,
            target: schema_of::<T>,
        });
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn primary_key_field(&self) -> Option<&FieldDef> {
        self.primary_key.and_then(|pk| self.find_field(pk))
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn find_relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|r| r.name == name)
    }
}

/// Trait for types the engine can filter and sort
///
/// # Example
///
/// ```
/// use filterkit::schema::{ColumnKind, Record, RecordSchema};
/// use filterkit::semantics::{Number, Value};
///
/// struct Currency {
///     id: i64,
///     code: String,
/// }
///
/// impl Record for Currency {
///     fn describe() -> RecordSchema {
///         RecordSchema::new("Currency", "currencies")
///             .field("id", "id", ColumnKind::Integer)
///             .field("currency_code", "code", ColumnKind::Text)
///             .primary_key("id")
///     }
///
///     fn field(&self, name: &str) -> Value<'_> {
///         match name {
///             "id" => Value::Number(Number::I64(self.id)),
///             "currency_code" => Value::Text(&self.code),
///             _ => Value::Null,
///         }
///     }
/// }
/// ```
pub trait Record: Send + Sync + 'static {
    /// Builds the schema; called once per type by the registry.
    fn describe() -> RecordSchema
    where
        Self: Sized;

    /// Returns the value of a field by external name, or [`Value::Null`].
    fn field(&self, name: &str) -> Value<'_>;

    /// Returns a loaded to-one relation by external name.
    fn relation(&self, _name: &str) -> Option<&dyn Record> {
        None
    }
}
