//! Field path resolution
//!
//! Maps a dotted path of external names (`currency.currency_code`) to a reader over
//! live records and to a table-qualified column plus the LEFT JOINs that reach it.

use std::sync::Arc;

use dashmap::DashMap;

use crate::core::UnknownFieldPolicy;
use crate::core::constants::{ALIAS_SEPARATOR, JOIN_ALIAS_PREFIX};
use crate::error::{FilterError, Result};
use crate::semantics::Value;

use super::record::{ColumnKind, Record, RecordSchema};

/// Table-qualified column reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    /// Table name for the base record, join alias otherwise
    pub table: String,
    pub column: &'static str,
}

/// A LEFT JOIN needed to reach a related table
#[derive(Debug, Clone)]
pub struct JoinSpec {
    /// Dotted relation path from the base record, e.g. `currency.issuer`
    pub relation_path: String,
    pub alias: String,
    pub table: &'static str,
    pub parent_alias: String,
    pub local_column: &'static str,
    pub foreign_column: &'static str,
    pub schema: Arc<RecordSchema>,
}

impl JoinSpec {
    /// Output alias for a projected column of this relation (`currency__code`)
    pub fn projection_alias(&self, column: &str) -> String {
        projection_alias(&self.relation_path, column)
    }
}

/// Output alias for a column of a joined relation, as seen by row mappers
pub fn projection_alias(relation_path: &str, column: &str) -> String {
    format!(
        "{}{}{}",
        relation_path.replace('.', ALIAS_SEPARATOR),
        ALIAS_SEPARATOR,
        column
    )
}

/// A field path resolved against a record schema
#[derive(Debug, Clone)]
pub struct ResolvedField {
    pub path: String,
    /// Relation names walked before the leaf field
    pub hops: Vec<&'static str>,
    pub leaf: &'static str,
    pub kind: ColumnKind,
    pub column: ColumnRef,
    pub joins: Vec<JoinSpec>,
}

impl ResolvedField {
    /// Read the field off a live record, following loaded relations
    ///
    /// A relation that is not loaded yields [`Value::Null`], matching a LEFT JOIN miss.
    pub fn read<'a>(&self, record: &'a dyn Record) -> Value<'a> {
        let mut current = record;
        for hop in &self.hops {
            match current.relation(hop) {
                Some(next) => current = next,
                None => return Value::Null,
            }
        }
        current.field(self.leaf)
    }
}

#[derive(Debug)]
enum Resolution {
    Resolved(Arc<ResolvedField>),
    Unknown,
    TooDeep,
}

/// Resolves and memoizes field paths
#[derive(Debug)]
pub struct FieldResolver {
    max_depth: usize,
    policy: UnknownFieldPolicy,
    /// Successful resolutions only, keyed by table, record name and path
    cache: DashMap<(&'static str, &'static str, String), Arc<ResolvedField>>,
}

impl FieldResolver {
    pub fn new(max_depth: usize, policy: UnknownFieldPolicy) -> Self {
        Self {
            max_depth,
            policy,
            cache: DashMap::new(),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn policy(&self) -> UnknownFieldPolicy {
        self.policy
    }

    /// Resolve a field path
    ///
    /// Returns `Ok(None)` for unknown or over-deep paths under
    /// [`UnknownFieldPolicy::Ignore`], an error under [`UnknownFieldPolicy::Reject`].
    pub fn resolve(&self, schema: &RecordSchema, path: &str) -> Result<Option<Arc<ResolvedField>>> {
        let key = (schema.table(), schema.name(), path.to_string());
        if let Some(cached) = self.cache.get(&key) {
            return Ok(Some(Arc::clone(cached.value())));
        }

        // Misses are recomputed so caller-supplied paths cannot grow the cache
        match self.resolve_uncached(schema, path) {
            Resolution::Resolved(field) => {
                self.cache.insert(key, Arc::clone(&field));
                Ok(Some(field))
            }
            Resolution::Unknown => self.reject_or_drop(FilterError::UnknownField {
                record: schema.name(),
                path: path.to_string(),
            }),
            Resolution::TooDeep => self.reject_or_drop(FilterError::FieldTooDeep {
                path: path.to_string(),
                max_depth: self.max_depth,
            }),
        }
    }

    /// Resolve a relation path (every segment a relation) to the joins that load it
    pub fn resolve_relation(
        &self,
        schema: &RecordSchema,
        path: &str,
    ) -> Result<Option<Vec<JoinSpec>>> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.len() > self.max_depth {
            return self.reject_or_drop(FilterError::FieldTooDeep {
                path: path.to_string(),
                max_depth: self.max_depth,
            });
        }

        match walk_relations(schema, &segments) {
            Some((joins, _, _)) => Ok(Some(joins)),
            None => self.reject_or_drop(FilterError::UnknownField {
                record: schema.name(),
                path: path.to_string(),
            }),
        }
    }

    fn reject_or_drop<T>(&self, err: FilterError) -> Result<Option<T>> {
        match self.policy {
            UnknownFieldPolicy::Reject => Err(err),
            UnknownFieldPolicy::Ignore => {
                tracing::debug!(error = %err, "Dropping unresolvable field reference");
                Ok(None)
            }
        }
    }

    fn resolve_uncached(&self, schema: &RecordSchema, path: &str) -> Resolution {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.len() > self.max_depth {
            return Resolution::TooDeep;
        }
        let Some((leaf_name, relation_segments)) = segments.split_last() else {
            return Resolution::Unknown;
        };

        let Some((joins, hops, owner)) = walk_relations(schema, relation_segments) else {
            return Resolution::Unknown;
        };
        let Some(leaf) = owner.find_field(leaf_name) else {
            return Resolution::Unknown;
        };

        let table = joins
            .last()
            .map(|j| j.alias.clone())
            .unwrap_or_else(|| schema.table().to_string());

        Resolution::Resolved(Arc::new(ResolvedField {
            path: path.to_string(),
            hops,
            leaf: leaf.name,
            kind: leaf.kind,
            column: ColumnRef {
                table,
                column: leaf.column,
            },
            joins,
        }))
    }
}

type RelationWalk = (Vec<JoinSpec>, Vec<&'static str>, Arc<RecordSchema>);

/// Follow relation segments from `schema`, returning joins, hop names and the last schema
fn walk_relations(schema: &RecordSchema, segments: &[&str]) -> Option<RelationWalk> {
    let mut joins = Vec::with_capacity(segments.len());
    let mut hops = Vec::with_capacity(segments.len());
    let mut owner = Arc::new(schema.clone());
    let mut parent_alias = schema.table().to_string();
    let mut relation_path = String::new();

    for segment in segments {
        let relation = owner.find_relation(segment)?;
        if !relation_path.is_empty() {
            relation_path.push('.');
        }
        relation_path.push_str(relation.name);

        let target = relation.target();
        let alias = format!(
            "{}{}",
            JOIN_ALIAS_PREFIX,
            relation_path.replace('.', ALIAS_SEPARATOR)
        );
        joins.push(JoinSpec {
            relation_path: relation_path.clone(),
            alias: alias.clone(),
            table: target.table(),
            parent_alias: parent_alias.clone(),
            local_column: relation.local_column,
            foreign_column: relation.foreign_column,
            schema: Arc::clone(&target),
        });
        hops.push(relation.name);
        parent_alias = alias;
        owner = target;
    }

    Some((joins, hops, owner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::schema_of;
    use crate::semantics::Number;

    struct Country {
        name: String,
    }

    impl Record for Country {
        fn describe() -> RecordSchema {
            RecordSchema::new("Country", "countries")
                .field("id", "id", ColumnKind::Integer)
                .field("name", "name", ColumnKind::Text)
                .primary_key("id")
        }

        fn field(&self, name: &str) -> Value<'_> {
            match name {
                "name" => Value::Text(&self.name),
                _ => Value::Null,
            }
        }
    }

    struct Currency {
        code: String,
        issuer: Option<Country>,
    }

    impl Record for Currency {
        fn describe() -> RecordSchema {
            RecordSchema::new("Currency", "currencies")
                .field("id", "id", ColumnKind::Integer)
                .field("currency_code", "code", ColumnKind::Text)
                .relation::<Country>("issuer", "country_id", "id")
                .primary_key("id")
        }

        fn field(&self, name: &str) -> Value<'_> {
            match name {
                "currency_code" => Value::Text(&self.code),
                _ => Value::Null,
            }
        }

        fn relation(&self, name: &str) -> Option<&dyn Record> {
            match name {
                "issuer" => self.issuer.as_ref().map(|c| c as &dyn Record),
                _ => None,
            }
        }
    }

    struct Account {
        id: i64,
        currency: Option<Currency>,
    }

    impl Record for Account {
        fn describe() -> RecordSchema {
            RecordSchema::new("Account", "accounts")
                .field("id", "id", ColumnKind::Integer)
                .relation::<Currency>("currency", "currency_id", "id")
                .primary_key("id")
        }

        fn field(&self, name: &str) -> Value<'_> {
            match name {
                "id" => Value::Number(Number::I64(self.id)),
                _ => Value::Null,
            }
        }

        fn relation(&self, name: &str) -> Option<&dyn Record> {
            match name {
                "currency" => self.currency.as_ref().map(|c| c as &dyn Record),
                _ => None,
            }
        }
    }

    fn account() -> Account {
        Account {
            id: 7,
            currency: Some(Currency {
                code: "EUR".into(),
                issuer: Some(Country {
                    name: "Ireland".into(),
                }),
            }),
        }
    }

    #[test]
    fn resolves_base_field() {
        let resolver = FieldResolver::new(3, UnknownFieldPolicy::Ignore);
        let field = resolver
            .resolve(&schema_of::<Account>(), "id")
            .unwrap()
            .unwrap();
        assert_eq!(field.column.table, "accounts");
        assert_eq!(field.column.column, "id");
        assert!(field.joins.is_empty());
        assert_eq!(field.read(&account()), Value::Number(Number::I64(7)));
    }

    #[test]
    fn resolves_relation_field_with_join() {
        let resolver = FieldResolver::new(3, UnknownFieldPolicy::Ignore);
        let field = resolver
            .resolve(&schema_of::<Account>(), "currency.currency_code")
            .unwrap()
            .unwrap();
        assert_eq!(field.column.table, "j_currency");
        assert_eq!(field.column.column, "code");
        assert_eq!(field.kind, ColumnKind::Text);
        assert_eq!(field.joins.len(), 1);
        assert_eq!(field.joins[0].table, "currencies");
        assert_eq!(field.joins[0].parent_alias, "accounts");
        assert_eq!(field.joins[0].local_column, "currency_id");
        assert_eq!(field.read(&account()), Value::Text("EUR"));
    }

    #[test]
    fn resolves_nested_relation_within_depth() {
        let resolver = FieldResolver::new(3, UnknownFieldPolicy::Ignore);
        let field = resolver
            .resolve(&schema_of::<Account>(), "currency.issuer.name")
            .unwrap()
            .unwrap();
        assert_eq!(field.column.table, "j_currency__issuer");
        assert_eq!(field.joins[1].parent_alias, "j_currency");
        assert_eq!(field.joins[1].projection_alias("name"), "currency__issuer__name");
        assert_eq!(field.read(&account()), Value::Text("Ireland"));
    }

    #[test]
    fn missing_relation_reads_null() {
        let resolver = FieldResolver::new(3, UnknownFieldPolicy::Ignore);
        let field = resolver
            .resolve(&schema_of::<Account>(), "currency.currency_code")
            .unwrap()
            .unwrap();
        let orphan = Account {
            id: 1,
            currency: None,
        };
        assert_eq!(field.read(&orphan), Value::Null);
    }

    #[test]
    fn over_deep_path_is_dropped_when_lenient() {
        let resolver = FieldResolver::new(2, UnknownFieldPolicy::Ignore);
        let result = resolver
            .resolve(&schema_of::<Account>(), "currency.issuer.name")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn over_deep_path_fails_when_strict() {
        let resolver = FieldResolver::new(2, UnknownFieldPolicy::Reject);
        let err = resolver
            .resolve(&schema_of::<Account>(), "currency.issuer.name")
            .unwrap_err();
        assert!(matches!(err, FilterError::FieldTooDeep { max_depth: 2, .. }));
    }

    #[test]
    fn internal_column_name_does_not_resolve() {
        let resolver = FieldResolver::new(3, UnknownFieldPolicy::Reject);
        let err = resolver
            .resolve(&schema_of::<Account>(), "currency.code")
            .unwrap_err();
        assert!(matches!(err, FilterError::UnknownField { .. }));
    }

    #[test]
    fn unknown_and_empty_segments_are_dropped() {
        let resolver = FieldResolver::new(3, UnknownFieldPolicy::Ignore);
        let schema = schema_of::<Account>();
        assert!(resolver.resolve(&schema, "nope").unwrap().is_none());
        assert!(resolver.resolve(&schema, "currency..code").unwrap().is_none());
        assert!(resolver.resolve(&schema, "").unwrap().is_none());
    }

    #[test]
    fn resolution_is_memoized() {
        let resolver = FieldResolver::new(3, UnknownFieldPolicy::Ignore);
        let schema = schema_of::<Account>();
        let a = resolver.resolve(&schema, "currency.currency_code").unwrap().unwrap();
        let b = resolver.resolve(&schema, "currency.currency_code").unwrap().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn unresolved_paths_are_not_cached() {
        let resolver = FieldResolver::new(2, UnknownFieldPolicy::Ignore);
        let schema = schema_of::<Account>();
        resolver.resolve(&schema, "currency.currency_code").unwrap();
        assert_eq!(resolver.cache.len(), 1);

        for i in 0..100 {
            let path = format!("made_up_{}", i);
            assert!(resolver.resolve(&schema, &path).unwrap().is_none());
        }
        assert!(resolver.resolve(&schema, "currency.issuer.name").unwrap().is_none());
        assert_eq!(resolver.cache.len(), 1);
    }

    #[test]
    fn same_record_name_on_different_tables_resolves_separately() {
        let resolver = FieldResolver::new(3, UnknownFieldPolicy::Ignore);
        let live =
            RecordSchema::new("Ledger", "ledger_live").field("total", "total", ColumnKind::Real);
        let archive = RecordSchema::new("Ledger", "ledger_archive")
            .field("total", "total", ColumnKind::Real);

        let a = resolver.resolve(&live, "total").unwrap().unwrap();
        let b = resolver.resolve(&archive, "total").unwrap().unwrap();
        assert_eq!(a.column.table, "ledger_live");
        assert_eq!(b.column.table, "ledger_archive");
    }

    #[test]
    fn resolves_preload_relation_path() {
        let resolver = FieldResolver::new(3, UnknownFieldPolicy::Ignore);
        let schema = schema_of::<Account>();
        let joins = resolver
            .resolve_relation(&schema, "currency.issuer")
            .unwrap()
            .unwrap();
        assert_eq!(joins.len(), 2);
        assert_eq!(joins[1].alias, "j_currency__issuer");
        assert!(resolver.resolve_relation(&schema, "id").unwrap().is_none());
    }
}
