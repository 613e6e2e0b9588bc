//! PostgreSQL SQL dialect implementation

use super::SqlDialect;

/// PostgreSQL SQL dialect
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn lower(&self, expr: &str) -> String {
        // LOWER follows the database locale; TRANSLATE folds ASCII only
        format!(
            "TRANSLATE({}, 'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz')",
            expr
        )
    }

    fn binary_order(&self, col: &str) -> String {
        format!("{} COLLATE \"C\"", col)
    }

    fn order_by_with_nulls(&self, col: &str, desc: bool, nulls_last: bool) -> String {
        let dir = if desc { "DESC" } else { "ASC" };
        let nulls = if nulls_last {
            "NULLS LAST"
        } else {
            "NULLS FIRST"
        };
        format!("{} {} {}", col, dir, nulls)
    }

    fn estimate_rows_sql(&self) -> Option<&'static str> {
        // reltuples is -1 for tables never vacuumed or analyzed
        Some("SELECT GREATEST(reltuples, 0)::BIGINT FROM pg_class WHERE relname = $1 AND relkind = 'r'")
    }
}
