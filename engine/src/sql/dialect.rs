//! SQL dialect trait for multi-database support
//!
//! This trait defines the interface for generating database-specific SQL syntax.

use crate::core::constants::MICROS_PER_DAY;

/// SQL dialect trait for generating database-specific SQL
///
/// Different databases have different syntax for:
/// - Parameter placeholders (? vs $1)
/// - Null ordering
/// - Byte-wise text ordering
/// - Catalog-based row count estimates
pub trait SqlDialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Generate a parameter placeholder for the given index (1-based)
    ///
    /// - SQLite: Always returns "?"
    /// - PostgreSQL: Returns "$1", "$2", etc.
    fn placeholder(&self, index: usize) -> String;

    /// Quote an identifier (table, alias or column name)
    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Table-qualified, quoted column reference
    fn qualified(&self, table: &str, column: &str) -> String {
        format!("{}.{}", self.quote_ident(table), self.quote_ident(column))
    }

    /// Generate LIMIT/OFFSET clause
    ///
    /// Most databases use `LIMIT x OFFSET y`, but syntax may vary.
    fn limit_offset(&self, limit: u64, offset: u64) -> String {
        format!("LIMIT {} OFFSET {}", limit, offset)
    }

    /// Fold ASCII letters of a text expression to lowercase
    ///
    /// Non-ASCII characters are left unchanged on every backend.
    fn lower(&self, expr: &str) -> String {
        format!("LOWER({})", expr)
    }

    /// Time of day, in microseconds, of an epoch-microsecond column
    ///
    /// Uses a floored modulo so timestamps before 1970 map into `[0, 1 day)`.
    fn time_of_day_micros(&self, col: &str) -> String {
        format!(
            "((({col} % {day}) + {day}) % {day})",
            col = col,
            day = MICROS_PER_DAY
        )
    }

    /// Text expression ordered byte-wise
    ///
    /// - SQLite: default BINARY collation already compares bytes
    /// - PostgreSQL: `col COLLATE "C"`
    fn binary_order(&self, col: &str) -> String {
        col.to_string()
    }

    /// Generate ORDER BY clause with NULL handling
    ///
    /// - Most: `col DESC NULLS LAST`
    /// - SQLite: emulated with a CASE expression
    fn order_by_with_nulls(&self, col: &str, desc: bool, nulls_last: bool) -> String;

    /// Cheap catalog query returning an approximate row count for a table
    ///
    /// The query returns a single integer column and binds the table name as its
    /// only parameter. `None` when the dialect has no such catalog.
    fn estimate_rows_sql(&self) -> Option<&'static str>;
}

impl std::fmt::Debug for dyn SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
