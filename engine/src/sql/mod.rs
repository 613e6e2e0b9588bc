//! Relational backend
//!
//! This module translates compiled specifications into SQL for different database
//! dialects (SQLite, PostgreSQL) and executes them on a SQLite pool.

mod dialect;
pub mod estimate;
pub mod executor;
mod params;
mod postgres_dialect;
pub mod row;
mod sqlite_dialect;
mod translator;

pub use dialect::SqlDialect;
pub use estimate::{
    ExactCountEstimator, FallbackEstimator, FixedEstimate, RowCountEstimator, SqliteStatEstimator,
};
pub use executor::RelationalExecutor;
pub use params::{SqlParam, SqlParams, escape_like_pattern};
pub use postgres_dialect::PostgresDialect;
pub use row::SqlRecord;
pub use sqlite_dialect::SqliteDialect;
pub use translator::{RelationalTranslator, TranslatedQuery};

/// Database dialect identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectKind {
    Sqlite,
    Postgres,
}

impl DialectKind {
    /// Get the SQL dialect for this database
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            DialectKind::Sqlite => &SqliteDialect,
            DialectKind::Postgres => &PostgresDialect,
        }
    }

    /// Get the dialect name
    pub fn name(&self) -> &'static str {
        match self {
            DialectKind::Sqlite => "sqlite",
            DialectKind::Postgres => "postgres",
        }
    }
}

impl std::fmt::Display for DialectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
