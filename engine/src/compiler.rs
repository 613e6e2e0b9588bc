//! Specification compilation
//!
//! Resolves every field path of a [`FilterSpecification`] against a record schema and
//! compiles its filters into conditions. The resulting [`CompiledSpec`] is consumed
//! unchanged by both backends.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;
use crate::filter::{DataType, FilterSpecification, Logic, SortDirection};
use crate::schema::{FieldResolver, JoinSpec, Record, RecordSchema, ResolvedField};
use crate::semantics::{CompiledCondition, compile, natural_data_type, order_directed};

/// A filter bound to its resolved field
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    pub field: Arc<ResolvedField>,
    pub condition: CompiledCondition,
}

impl CompiledFilter {
    pub fn matches(&self, record: &dyn Record) -> bool {
        self.condition.matches(&self.field.read(record))
    }
}

/// A resolved sort key
#[derive(Debug, Clone)]
pub struct SortKey {
    pub field: Arc<ResolvedField>,
    pub data_type: DataType,
    pub direction: SortDirection,
}

/// A filter specification resolved and validated against one record schema
#[derive(Debug, Clone)]
pub struct CompiledSpec {
    pub schema: Arc<RecordSchema>,
    pub logic: Logic,
    pub filters: Vec<CompiledFilter>,
    /// Requested sort keys followed by the ascending primary-key tie-break
    pub sort: Vec<SortKey>,
    /// LEFT JOINs for filters, sort keys and preloads; parents precede children
    pub joins: Vec<JoinSpec>,
}

impl CompiledSpec {
    /// Evaluate the filter list against a record
    ///
    /// An empty filter list matches every record.
    pub fn matches(&self, record: &dyn Record) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        match self.logic {
            Logic::And => self.filters.iter().all(|f| f.matches(record)),
            Logic::Or => self.filters.iter().any(|f| f.matches(record)),
        }
    }

    /// Total order over records by the sort keys
    pub fn cmp_records(&self, a: &dyn Record, b: &dyn Record) -> Ordering {
        for key in &self.sort {
            let ordering = order_directed(
                key.data_type,
                key.direction,
                &key.field.read(a),
                &key.field.read(b),
            );
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Resolve and compile a specification
///
/// Unresolvable paths are dropped or rejected according to the resolver's policy;
/// invalid values, ranges and mode/type combinations always fail.
pub fn compile_specification(
    resolver: &FieldResolver,
    schema: Arc<RecordSchema>,
    spec: &FilterSpecification,
) -> Result<CompiledSpec> {
    let mut joins = JoinSet::default();

    let mut filters = Vec::with_capacity(spec.filters.len());
    for filter in &spec.filters {
        let Some(field) = resolver.resolve(&schema, &filter.field)? else {
            continue;
        };
        let condition = compile(filter, field.kind)?;
        joins.extend(&field.joins);
        filters.push(CompiledFilter { field, condition });
    }

    let mut sort = Vec::with_capacity(spec.sort.len() + 1);
    for sort_field in &spec.sort {
        let Some(field) = resolver.resolve(&schema, &sort_field.field)? else {
            continue;
        };
        joins.extend(&field.joins);
        sort.push(SortKey {
            data_type: natural_data_type(field.kind),
            direction: sort_field.direction,
            field,
        });
    }

    if let Some(pk) = schema.primary_key_field() {
        let already_sorted = sort
            .iter()
            .any(|key| key.field.hops.is_empty() && key.field.leaf == pk.name);
        if !already_sorted {
            if let Some(field) = resolver.resolve(&schema, pk.name)? {
                sort.push(SortKey {
                    data_type: natural_data_type(field.kind),
                    direction: SortDirection::Asc,
                    field,
                });
            }
        }
    }

    for relation in &spec.preload {
        if let Some(relation_joins) = resolver.resolve_relation(&schema, relation)? {
            joins.extend(&relation_joins);
        }
    }

    let dropped = spec.filters.len() - filters.len();
    tracing::debug!(
        record = schema.name(),
        filters = filters.len(),
        dropped,
        sort_keys = sort.len(),
        joins = joins.items.len(),
        "Compiled filter specification"
    );

    Ok(CompiledSpec {
        schema,
        logic: spec.logic,
        filters,
        sort,
        joins: joins.items,
    })
}

#[derive(Default)]
struct JoinSet {
    seen: HashSet<String>,
    items: Vec<JoinSpec>,
}

impl JoinSet {
    fn extend(&mut self, joins: &[JoinSpec]) {
        for join in joins {
            if self.seen.insert(join.alias.clone()) {
                self.items.push(join.clone());
            }
        }
    }
}
