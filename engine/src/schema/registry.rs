//! Process-wide schema cache
//!
//! Schemas are built once per record type and never mutated afterwards, so readers
//! share them through `Arc` without further locking.

use std::any::TypeId;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use super::record::{Record, RecordSchema};

static SCHEMAS: LazyLock<DashMap<TypeId, Arc<RecordSchema>>> = LazyLock::new(DashMap::new);

/// Get the cached schema for a record type, describing it on first use
pub fn schema_of<T: Record>() -> Arc<RecordSchema> {
    let id = TypeId::of::<T>();
    if let Some(schema) = SCHEMAS.get(&id) {
        return Arc::clone(schema.value());
    }

    // Describe outside the map lock; a concurrent first use keeps the earlier insert
    let schema = Arc::new(T::describe());
    let cached = Arc::clone(SCHEMAS.entry(id).or_insert(schema).value());
    tracing::debug!(
        record = cached.name(),
        table = cached.table(),
        "Registered record schema"
    );
    cached
}
