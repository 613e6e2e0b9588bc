//! Runs translated queries on a SQLite pool

use sqlx::SqlitePool;
use sqlx::query::QueryAs;
use sqlx::sqlite::{Sqlite, SqliteArguments};

use crate::error::Result;
use crate::pagination::{Page, PaginationResult};

use super::params::SqlParam;
use super::row::SqlRecord;
use super::translator::TranslatedQuery;

/// Executes count + page queries; at most two round trips per page
#[derive(Debug, Clone)]
pub struct RelationalExecutor {
    pool: SqlitePool,
}

impl RelationalExecutor {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Count matching rows and fetch one page of them
    pub async fn fetch_page<T: SqlRecord>(
        &self,
        query: &TranslatedQuery,
        page: Page,
    ) -> Result<PaginationResult<T>> {
        let count_sql = query.count_sql();
        let (total,) = bind_params(sqlx::query_as::<_, (i64,)>(&count_sql), &query.params.values)
            .fetch_one(&self.pool)
            .await?;

        let total = u64::try_from(total).unwrap_or(0);
        if u64::try_from(page.offset()).unwrap_or(u64::MAX) >= total {
            return Ok(PaginationResult::new(Vec::new(), total, page));
        }

        let page_sql = query.page_sql(page);
        tracing::debug!(sql = %page_sql, total, "Fetching page");
        let records = bind_params(sqlx::query_as::<_, T>(&page_sql), &query.params.values)
            .fetch_all(&self.pool)
            .await?;

        Ok(PaginationResult::new(records, total, page))
    }

    /// Fetch every row of an unfiltered select
    pub async fn fetch_all<T: SqlRecord>(&self, sql: &str) -> Result<Vec<T>> {
        tracing::debug!(sql = %sql, "Fetching all rows");
        let records = sqlx::query_as::<_, T>(sql).fetch_all(&self.pool).await?;
        Ok(records)
    }
}

/// Bind parameters in insertion order
fn bind_params<'q, O>(
    mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    params: &[SqlParam],
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            SqlParam::Text(value) => query.bind(value.clone()),
            SqlParam::Int(value) => query.bind(*value),
            SqlParam::Real(value) => query.bind(*value),
            SqlParam::Bool(value) => query.bind(*value),
        };
    }
    query
}
