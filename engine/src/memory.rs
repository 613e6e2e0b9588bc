//! In-memory evaluation backend
//!
//! Filters a record slice with a [`CompiledSpec`], then stable-sorts and paginates.
//! Large inputs are split into contiguous chunks evaluated on the rayon pool; the
//! per-chunk matches are concatenated in input order so partitioning never changes the
//! output.

use rayon::prelude::*;

use crate::compiler::CompiledSpec;
use crate::pagination::{Page, PaginationResult};
use crate::schema::Record;

#[derive(Debug, Clone, Copy)]
pub struct MemoryEvaluator {
    parallel_min_records: usize,
}

impl MemoryEvaluator {
    /// Inputs shorter than `parallel_min_records` are evaluated on the calling thread
    pub fn new(parallel_min_records: usize) -> Self {
        Self {
            parallel_min_records: parallel_min_records.max(1),
        }
    }

    fn is_parallel(&self, len: usize) -> bool {
        len >= self.parallel_min_records
    }

    fn chunk_size(&self, len: usize) -> usize {
        (self.parallel_min_records / 4)
            .max(len / rayon::current_num_threads().max(1))
            .max(1)
    }

    /// Indices of matching records, in input order
    pub fn filter_indices<T: Record>(&self, records: &[T], spec: &CompiledSpec) -> Vec<usize> {
        if !self.is_parallel(records.len()) {
            return records
                .iter()
                .enumerate()
                .filter(|(_, record)| spec.matches(*record))
                .map(|(i, _)| i)
                .collect();
        }

        let chunk_size = self.chunk_size(records.len());
        tracing::trace!(
            records = records.len(),
            chunk_size,
            "Filtering records in parallel"
        );
        let partials: Vec<Vec<usize>> = records
            .par_chunks(chunk_size)
            .enumerate()
            .map(|(chunk, slice)| {
                let base = chunk * chunk_size;
                slice
                    .iter()
                    .enumerate()
                    .filter(|(_, record)| spec.matches(*record))
                    .map(|(i, _)| base + i)
                    .collect()
            })
            .collect();
        partials.concat()
    }

    /// Indices of matching records in sorted order
    pub fn sorted_indices<T: Record>(&self, records: &[T], spec: &CompiledSpec) -> Vec<usize> {
        let mut matched = self.filter_indices(records, spec);
        let by_keys = |a: &usize, b: &usize| spec.cmp_records(&records[*a], &records[*b]);
        if self.is_parallel(matched.len()) {
            matched.par_sort_by(by_keys);
        } else {
            matched.sort_by(by_keys);
        }
        matched
    }

    /// Filter and sort, borrowing the records
    pub fn evaluate<'a, T: Record>(&self, records: &'a [T], spec: &CompiledSpec) -> Vec<&'a T> {
        self.sorted_indices(records, spec)
            .into_iter()
            .map(|i| &records[i])
            .collect()
    }

    /// Filter, sort and slice one page, borrowing the records
    pub fn paginate<'a, T: Record>(
        &self,
        records: &'a [T],
        spec: &CompiledSpec,
        page: Page,
    ) -> PaginationResult<&'a T> {
        PaginationResult::from_sorted(self.evaluate(records, spec), page)
    }

    /// Filter, sort and slice one page, consuming the records
    pub fn paginate_owned<T: Record>(
        &self,
        records: Vec<T>,
        spec: &CompiledSpec,
        page: Page,
    ) -> PaginationResult<T> {
        let sorted = self.sorted_indices(&records, spec);
        let total = sorted.len() as u64;
        let bounds = page.bounds(sorted.len());

        let mut slots: Vec<Option<T>> = records.into_iter().map(Some).collect();
        let selected = sorted[bounds]
            .iter()
            .filter_map(|&i| slots[i].take())
            .collect();
        PaginationResult::new(selected, total, page)
    }
}
