//! Page requests and the result envelope shared by every backend

use serde::Serialize;

/// Raw page request as supplied by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// 0-based page index; negative values clamp to 0
    pub index: i64,
    /// Page size; non-positive values use the configured default
    pub size: i64,
}

impl PageRequest {
    pub fn new(index: i64, size: i64) -> Self {
        Self { index, size }
    }

    /// Apply the normalization rule used by every execution path
    pub fn normalize(self, default_size: usize) -> Page {
        let size = match usize::try_from(self.size) {
            Ok(size) if size > 0 => size,
            _ => default_size.max(1),
        };
        let index = usize::try_from(self.index).unwrap_or(0);
        Page { index, size }
    }
}

/// A normalized page: non-negative index, positive size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub size: usize,
}

impl Page {
    /// Row offset of the first record on this page (saturating)
    pub fn offset(&self) -> usize {
        self.index.saturating_mul(self.size)
    }

    /// Index range of this page within `total` records; empty past the end
    pub fn bounds(&self, total: usize) -> std::ops::Range<usize> {
        let start = self.offset().min(total);
        let end = start.saturating_add(self.size).min(total);
        start..end
    }
}

/// Uniform page envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationResult<T> {
    pub records: Vec<T>,
    pub total_size: u64,
    pub total_pages: u64,
    pub page_index: usize,
    pub page_size: usize,
}

impl<T> PaginationResult<T> {
    pub fn new(records: Vec<T>, total_size: u64, page: Page) -> Self {
        Self {
            records,
            total_size,
            total_pages: total_size.div_ceil(page.size as u64),
            page_index: page.index,
            page_size: page.size,
        }
    }

    /// Slice one page out of an already filtered and sorted collection
    pub fn from_sorted(mut sorted: Vec<T>, page: Page) -> Self {
        let total = sorted.len();
        let bounds = page.bounds(total);
        sorted.truncate(bounds.end);
        let records = sorted.split_off(bounds.start);
        Self::new(records, total as u64, page)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginationResult<U> {
        PaginationResult {
            records: self.records.into_iter().map(f).collect(),
            total_size: self.total_size,
            total_pages: self.total_pages,
            page_index: self.page_index,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_index_and_defaults_size() {
        assert_eq!(PageRequest::new(-3, 0).normalize(20), Page { index: 0, size: 20 });
        assert_eq!(PageRequest::new(2, -5).normalize(20), Page { index: 2, size: 20 });
        assert_eq!(PageRequest::new(1, 7).normalize(20), Page { index: 1, size: 7 });
        assert_eq!(PageRequest::new(0, 0).normalize(0), Page { index: 0, size: 1 });
    }

    #[test]
    fn pages_of_three_over_ten() {
        let sizes: Vec<usize> = (0..5)
            .map(|i| {
                let page = PageRequest::new(i, 3).normalize(20);
                PaginationResult::from_sorted((0..10).collect::<Vec<_>>(), page)
                    .records
                    .len()
            })
            .collect();
        assert_eq!(sizes, vec![3, 3, 3, 1, 0]);
    }

    #[test]
    fn page_contents_and_meta() {
        let page = PageRequest::new(3, 3).normalize(20);
        let result = PaginationResult::from_sorted((0..10).collect::<Vec<_>>(), page);
        assert_eq!(result.records, vec![9]);
        assert_eq!(result.total_size, 10);
        assert_eq!(result.total_pages, 4);
        assert_eq!(result.page_index, 3);
        assert_eq!(result.page_size, 3);
    }

    #[test]
    fn huge_index_does_not_overflow() {
        let page = PageRequest::new(i64::MAX, i64::MAX).normalize(20);
        assert_eq!(page.bounds(10), 10..10);
    }

    #[test]
    fn empty_collection_has_zero_pages() {
        let page = PageRequest::default().normalize(20);
        let result = PaginationResult::<u8>::from_sorted(Vec::new(), page);
        assert_eq!(result.total_pages, 0);
        assert!(result.records.is_empty());
    }

    #[test]
    fn serializes_envelope() {
        let page = PageRequest::new(0, 2).normalize(20);
        let result = PaginationResult::from_sorted(vec!["a", "b", "c"], page);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["records"], serde_json::json!(["a", "b"]));
        assert_eq!(json["total_pages"], 2);
    }
}
