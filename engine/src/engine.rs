//! Engine facade
//!
//! Wires configuration, field resolution, both backends and the hybrid selector behind
//! three entry points: [`Engine::find_in_memory`], [`Engine::find_relational`] and
//! [`Engine::find_hybrid`]. All three compile the specification the same way and
//! normalize the page request with the same rule.

use crate::compiler::{CompiledSpec, compile_specification};
use crate::core::EngineConfig;
use crate::error::{FilterError, Result};
use crate::filter::FilterSpecification;
use crate::hybrid::{Backend, HybridSelector};
use crate::memory::MemoryEvaluator;
use crate::pagination::{PageRequest, PaginationResult};
use crate::schema::{FieldResolver, Record, schema_of};
use crate::sql::{
    DialectKind, RelationalExecutor, RelationalTranslator, RowCountEstimator, SqlRecord,
    TranslatedQuery,
};

#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    resolver: FieldResolver,
    evaluator: MemoryEvaluator,
    selector: HybridSelector,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            resolver: FieldResolver::new(config.max_depth, config.unknown_fields),
            evaluator: MemoryEvaluator::new(config.parallel_min_records),
            selector: HybridSelector::new(config.hybrid_threshold),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve and validate a specification for record type `T`
    pub fn compile<T: Record>(&self, spec: &FilterSpecification) -> Result<CompiledSpec> {
        compile_specification(&self.resolver, schema_of::<T>(), spec)
    }

    /// Render a specification as SQL for a dialect without executing it
    pub fn translate<T: Record>(
        &self,
        spec: &FilterSpecification,
        dialect: DialectKind,
    ) -> Result<TranslatedQuery> {
        let compiled = self.compile::<T>(spec)?;
        Ok(RelationalTranslator::new(dialect.dialect()).translate(&compiled))
    }

    /// Filter, sort and page records already in memory
    pub fn find_in_memory<'a, T: Record>(
        &self,
        records: &'a [T],
        spec: &FilterSpecification,
        page: PageRequest,
    ) -> Result<PaginationResult<&'a T>> {
        let compiled = self.compile::<T>(spec)?;
        let page = page.normalize(self.config.default_page_size);
        Ok(self.evaluator.paginate(records, &compiled, page))
    }

    /// Count and page in the database (two round trips)
    pub async fn find_relational<T: SqlRecord>(
        &self,
        executor: &RelationalExecutor,
        spec: &FilterSpecification,
        page: PageRequest,
    ) -> Result<PaginationResult<T>> {
        let query = self.translate::<T>(spec, DialectKind::Sqlite)?;
        let page = page.normalize(self.config.default_page_size);
        executor.fetch_page(&query, page).await
    }

    /// Pick a backend from the estimated table size
    pub async fn select_backend<T: Record>(&self, estimator: &dyn RowCountEstimator) -> Backend {
        let schema = schema_of::<T>();
        let estimate = estimator.estimate(schema.table()).await;
        let backend = self.selector.select(estimate);
        tracing::debug!(
            record = schema.name(),
            estimator = estimator.estimator_name(),
            threshold = self.selector.threshold(),
            %backend,
            "Selected backend"
        );
        backend
    }

    /// Run on whichever backend suits the estimated volume
    ///
    /// Small tables are fetched whole and evaluated off the async runtime; large or
    /// unestimable ones are counted and paged in the database. Both paths return the
    /// same totals and pages for the same data.
    pub async fn find_hybrid<T: SqlRecord>(
        &self,
        executor: &RelationalExecutor,
        estimator: &dyn RowCountEstimator,
        spec: &FilterSpecification,
        page: PageRequest,
    ) -> Result<PaginationResult<T>> {
        // Validate before touching the database
        let compiled = self.compile::<T>(spec)?;
        let page = page.normalize(self.config.default_page_size);
        let translator = RelationalTranslator::new(DialectKind::Sqlite.dialect());

        match self.select_backend::<T>(estimator).await {
            Backend::Relational => {
                let query = translator.translate(&compiled);
                executor.fetch_page(&query, page).await
            }
            Backend::Memory => {
                let sql = translator.select_all_sql(&compiled);
                let records: Vec<T> = executor.fetch_all(&sql).await?;
                let evaluator = self.evaluator;
                tokio::task::spawn_blocking(move || {
                    evaluator.paginate_owned(records, &compiled, page)
                })
                .await
                .map_err(|e| FilterError::Worker(e.to_string()))
            }
        }
    }
}
