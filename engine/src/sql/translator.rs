//! Compiled specification → parameterized SQL
//!
//! Renders the same [`Condition`] table the in-memory evaluator interprets. Every column
//! is table-qualified, so a single OR group may mix base-table and joined-table fields,
//! and every filter value is a bound parameter.

use crate::compiler::{CompiledSpec, SortKey};
use crate::filter::{DataType, Logic};
use crate::pagination::Page;
use crate::schema::JoinSpec;
use crate::semantics::{CompiledCondition, Condition, Projection, TextOp};

use super::dialect::SqlDialect;
use super::params::{SqlParam, SqlParams, escape_like_pattern};

/// SQL fragments for one compiled specification
#[derive(Debug, Clone)]
pub struct TranslatedQuery {
    dialect: &'static dyn SqlDialect,
    /// Quoted base table
    pub table: String,
    /// Rendered `LEFT JOIN ... ON ...` clauses, parents first
    pub joins: Vec<String>,
    /// Base columns followed by aliased columns of every joined relation
    pub select_list: String,
    pub where_clause: Option<String>,
    pub order_clause: String,
    pub params: SqlParams,
}

impl TranslatedQuery {
    fn from_where(&self) -> String {
        let mut sql = format!("FROM {}", self.table);
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if let Some(where_clause) = &self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(where_clause);
        }
        sql
    }

    /// Total matching rows; same FROM/JOIN/WHERE as the page query
    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) {}", self.from_where())
    }

    /// One page of matching rows in sort order
    pub fn page_sql(&self, page: Page) -> String {
        let mut sql = format!("SELECT {} {}", self.select_list, self.from_where());
        if !self.order_clause.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_clause);
        }
        sql.push(' ');
        sql.push_str(
            &self
                .dialect
                .limit_offset(sql_integer(page.size), sql_integer(page.offset())),
        );
        sql
    }
}

/// LIMIT/OFFSET operand clamped to the signed 64-bit range databases accept
fn sql_integer(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX).min(i64::MAX as u64)
}

/// Translates compiled specifications for one dialect
#[derive(Clone, Copy)]
pub struct RelationalTranslator {
    dialect: &'static dyn SqlDialect,
}

impl RelationalTranslator {
    pub fn new(dialect: &'static dyn SqlDialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &'static dyn SqlDialect {
        self.dialect
    }

    pub fn translate(&self, spec: &CompiledSpec) -> TranslatedQuery {
        let mut params = SqlParams::default();

        let where_clause = if spec.filters.is_empty() {
            None
        } else {
            let separator = match spec.logic {
                Logic::And => " AND ",
                Logic::Or => " OR ",
            };
            let predicates: Vec<String> = spec
                .filters
                .iter()
                .map(|filter| {
                    let column = self
                        .dialect
                        .qualified(&filter.field.column.table, filter.field.column.column);
                    format!(
                        "({})",
                        self.render_condition(&column, &filter.condition, &mut params)
                    )
                })
                .collect();
            Some(predicates.join(separator))
        };

        let query = TranslatedQuery {
            dialect: self.dialect,
            table: self.dialect.quote_ident(spec.schema.table()),
            joins: self.render_joins(&spec.joins),
            select_list: self.select_list(spec),
            where_clause,
            order_clause: self.render_order(&spec.sort),
            params,
        };

        tracing::debug!(
            dialect = self.dialect.name(),
            table = spec.schema.table(),
            joins = query.joins.len(),
            params = query.params.len(),
            "Translated filter specification"
        );
        query
    }

    /// Every row with its joined relations, ordered by primary key
    pub fn select_all_sql(&self, spec: &CompiledSpec) -> String {
        let mut sql = format!(
            "SELECT {} FROM {}",
            self.select_list(spec),
            self.dialect.quote_ident(spec.schema.table())
        );
        for join in self.render_joins(&spec.joins) {
            sql.push(' ');
            sql.push_str(&join);
        }
        if let Some(pk) = spec.schema.primary_key_field() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.dialect.qualified(spec.schema.table(), pk.column));
            sql.push_str(" ASC");
        }
        sql
    }

    fn select_list(&self, spec: &CompiledSpec) -> String {
        let mut columns = vec![format!("{}.*", self.dialect.quote_ident(spec.schema.table()))];
        for join in &spec.joins {
            for field in join.schema.fields() {
                columns.push(format!(
                    "{} AS {}",
                    self.dialect.qualified(&join.alias, field.column),
                    self.dialect.quote_ident(&join.projection_alias(field.column))
                ));
            }
        }
        columns.join(", ")
    }

    fn render_joins(&self, joins: &[JoinSpec]) -> Vec<String> {
        joins
            .iter()
            .map(|join| {
                format!(
                    "LEFT JOIN {} AS {} ON {} = {}",
                    self.dialect.quote_ident(join.table),
                    self.dialect.quote_ident(&join.alias),
                    self.dialect.qualified(&join.alias, join.foreign_column),
                    self.dialect.qualified(&join.parent_alias, join.local_column)
                )
            })
            .collect()
    }

    fn render_order(&self, sort: &[SortKey]) -> String {
        sort.iter()
            .map(|key| {
                let mut column = self
                    .dialect
                    .qualified(&key.field.column.table, key.field.column.column);
                if key.data_type == DataType::Text {
                    column = self.dialect.binary_order(&column);
                }
                self.dialect
                    .order_by_with_nulls(&column, key.direction.is_desc(), true)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn bind(&self, params: &mut SqlParams, value: impl Into<SqlParam>) -> String {
        self.dialect.placeholder(params.push(value))
    }

    fn render_condition(
        &self,
        column: &str,
        compiled: &CompiledCondition,
        params: &mut SqlParams,
    ) -> String {
        let expr = match compiled.projection {
            Projection::Identity => column.to_string(),
            Projection::TimeOfDay => self.dialect.time_of_day_micros(column),
        };

        let test = match &compiled.condition {
            Condition::Empty {
                negated,
                blank_text,
            } => {
                return match (*negated, *blank_text) {
                    (false, true) => format!("{e} IS NULL OR {e} = ''", e = expr),
                    (true, true) => format!("{e} IS NOT NULL AND {e} <> ''", e = expr),
                    (false, false) => format!("{} IS NULL", expr),
                    (true, false) => format!("{} IS NOT NULL", expr),
                };
            }
            Condition::Text {
                op,
                needle,
                negated,
            } => {
                let lowered = self.dialect.lower(&expr);
                let test = match op {
                    TextOp::Equals => {
                        let ph = self.bind(params, SqlParam::Text(needle.clone()));
                        format!("{} = {}", lowered, ph)
                    }
                    TextOp::Contains | TextOp::StartsWith | TextOp::EndsWith => {
                        let escaped = escape_like_pattern(needle);
                        let pattern = match op {
                            TextOp::Contains => format!("%{}%", escaped),
                            TextOp::StartsWith => format!("{}%", escaped),
                            _ => format!("%{}", escaped),
                        };
                        let ph = self.bind(params, SqlParam::Text(pattern));
                        format!("{} LIKE {} ESCAPE '\\'", lowered, ph)
                    }
                };
                if *negated {
                    format!("NOT ({})", test)
                } else {
                    test
                }
            }
            Condition::Compare { op, operand } => {
                let ph = self.bind(params, *operand);
                format!("{} {} {}", expr, op.as_sql(), ph)
            }
            Condition::Within {
                lower,
                upper,
                upper_inclusive,
                negated,
            } => {
                let lower_ph = self.bind(params, *lower);
                let upper_ph = self.bind(params, *upper);
                let upper_op = if *upper_inclusive { "<=" } else { "<" };
                let test = format!(
                    "{e} >= {} AND {e} {} {}",
                    lower_ph,
                    upper_op,
                    upper_ph,
                    e = expr
                );
                if *negated {
                    format!("NOT ({})", test)
                } else {
                    test
                }
            }
        };

        if compiled.condition.matches_null() {
            format!("{} IS NULL OR {}", expr, test)
        } else {
            test
        }
    }
}
