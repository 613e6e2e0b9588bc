//! Row count estimators
//!
//! Estimates feed the hybrid selector only. They may be stale or approximate; a failed
//! estimate is never fatal to a request.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error::{FilterError, Result};

use super::SqlDialect;
use super::sqlite_dialect::SqliteDialect;

/// Row count estimator trait
///
/// Implementations should be cheap relative to the query they are sizing.
#[async_trait]
pub trait RowCountEstimator: Send + Sync {
    /// Approximate number of rows in `table`
    async fn estimate(&self, table: &str) -> Result<u64>;

    /// Estimator name for debugging/logging
    fn estimator_name(&self) -> &'static str;
}

/// Reads the row count recorded by `ANALYZE` in `sqlite_stat1`
#[derive(Debug, Clone)]
pub struct SqliteStatEstimator {
    pool: SqlitePool,
}

impl SqliteStatEstimator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RowCountEstimator for SqliteStatEstimator {
    async fn estimate(&self, table: &str) -> Result<u64> {
        let sql = SqliteDialect
            .estimate_rows_sql()
            .ok_or_else(|| FilterError::estimate(table, "dialect has no statistics catalog"))?;

        let row: Option<(i64,)> = sqlx::query_as(sql)
            .bind(table)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| FilterError::estimate(table, e.to_string()))?;

        match row {
            Some((rows,)) => Ok(u64::try_from(rows).unwrap_or(0)),
            None => Err(FilterError::estimate(table, "no statistics recorded")),
        }
    }

    fn estimator_name(&self) -> &'static str {
        "sqlite_stat1"
    }
}

/// Exact `COUNT(*)`; the universal fallback
#[derive(Debug, Clone)]
pub struct ExactCountEstimator {
    pool: SqlitePool,
}

impl ExactCountEstimator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RowCountEstimator for ExactCountEstimator {
    async fn estimate(&self, table: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", SqliteDialect.quote_ident(table));
        let (rows,): (i64,) = sqlx::query_as(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| FilterError::estimate(table, e.to_string()))?;
        Ok(u64::try_from(rows).unwrap_or(0))
    }

    fn estimator_name(&self) -> &'static str {
        "exact_count"
    }
}

/// Tries estimators in order and returns the first success
pub struct FallbackEstimator {
    chain: Vec<Box<dyn RowCountEstimator>>,
}

impl FallbackEstimator {
    pub fn new(chain: Vec<Box<dyn RowCountEstimator>>) -> Self {
        Self { chain }
    }

    /// Statistics first, exact count when no statistics exist
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self::new(vec![
            Box::new(SqliteStatEstimator::new(pool.clone())),
            Box::new(ExactCountEstimator::new(pool)),
        ])
    }
}

#[async_trait]
impl RowCountEstimator for FallbackEstimator {
    async fn estimate(&self, table: &str) -> Result<u64> {
        let mut last_error = None;
        for estimator in &self.chain {
            match estimator.estimate(table).await {
                Ok(rows) => return Ok(rows),
                Err(e) => {
                    tracing::debug!(
                        estimator = estimator.estimator_name(),
                        table,
                        error = %e,
                        "Row count estimator failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| FilterError::estimate(table, "no estimators configured")))
    }

    fn estimator_name(&self) -> &'static str {
        "fallback"
    }
}

/// Constant estimate, for embedders that track volume themselves
#[derive(Debug, Clone, Copy)]
pub struct FixedEstimate(pub u64);

#[async_trait]
impl RowCountEstimator for FixedEstimate {
    async fn estimate(&self, _table: &str) -> Result<u64> {
        Ok(self.0)
    }

    fn estimator_name(&self) -> &'static str {
        "fixed"
    }
}
