//! Local cursor over a fully materialized dataset.
//!
//! Pages are zero-indexed slices of the cached items. Navigation never
//! touches the store.

use serde::{Deserialize, Serialize};

use crate::query::DEFAULT_PAGE_SIZE;

/// What navigation does with page indices past the last page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageBounds {
    /// Accept any index; pages past the end are empty.
    #[default]
    Tolerant,
    /// Clamp indices to the last page (page 0 when empty).
    Clamp,
}

/// Cursor over an owned, immutable-between-replacements item sequence
#[derive(Debug, Clone)]
pub struct Pager<T> {
    items: Vec<T>,
    page_size: usize,
    page: usize,
    bounds: PageBounds,
}

impl<T> Default for Pager<T> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl<T> Pager<T> {
    /// Create an empty pager. Page size is raised to at least 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            page_size: page_size.max(1),
            page: 0,
            bounds: PageBounds::Tolerant,
        }
    }

    pub fn with_bounds(mut self, bounds: PageBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Replace the dataset wholesale and rewind to page 0.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.page = 0;
    }

    /// Change the page length and rewind to page 0.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 0;
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn bounds(&self) -> PageBounds {
        self.bounds
    }

    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    /// `ceil(total / page_size)`; zero for an empty dataset.
    pub fn total_pages(&self) -> usize {
        self.items.len().div_ceil(self.page_size)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Items of the current page. Empty when the page starts past the end.
    pub fn visible(&self) -> &[T] {
        let Some(start) = self.page.checked_mul(self.page_size) else {
            return &[];
        };
        if start >= self.items.len() {
            return &[];
        }
        let end = start.saturating_add(self.page_size).min(self.items.len());
        &self.items[start..end]
    }

    /// Move to page `n` and return its items.
    pub fn go_to_page(&mut self, n: usize) -> &[T] {
        self.page = match self.bounds {
            PageBounds::Tolerant => n,
            PageBounds::Clamp => n.min(self.total_pages().saturating_sub(1)),
        };
        self.visible()
    }

    /// Advance one page. Not clamped under the tolerant policy.
    pub fn next_page(&mut self) -> &[T] {
        self.go_to_page(self.page.saturating_add(1))
    }

    /// Go back one page, stopping at page 0.
    pub fn prev_page(&mut self) -> &[T] {
        self.go_to_page(self.page.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pager(total: usize, page_size: usize) -> Pager<usize> {
        let mut p = Pager::new(page_size);
        p.replace((0..total).collect());
        p
    }

    #[test]
    fn forty_five_items_in_pages_of_twenty() {
        let mut p = pager(45, 20);

        assert_eq!(p.total_pages(), 3);
        assert_eq!(p.go_to_page(0).len(), 20);
        assert_eq!(p.go_to_page(1).len(), 20);
        assert_eq!(p.go_to_page(2), &[40, 41, 42, 43, 44]);
        assert!(p.go_to_page(3).is_empty());
        assert_eq!(p.page(), 3);
    }

    #[test]
    fn prev_page_stops_at_zero() {
        let mut p = pager(10, 3);
        assert_eq!(p.prev_page(), &[0, 1, 2]);
        assert_eq!(p.page(), 0);
    }

    #[test]
    fn next_page_runs_past_the_end() {
        let mut p = pager(4, 2);
        p.go_to_page(1);
        assert!(p.next_page().is_empty());
        assert_eq!(p.page(), 2);
        assert_eq!(p.prev_page(), &[2, 3]);
    }

    #[test]
    fn clamp_policy_stays_on_last_page() {
        let mut p = pager(45, 20).with_bounds(PageBounds::Clamp);
        assert_eq!(p.go_to_page(7).len(), 5);
        assert_eq!(p.page(), 2);
        assert_eq!(p.next_page().len(), 5);
        assert_eq!(p.page(), 2);

        let mut empty = pager(0, 20).with_bounds(PageBounds::Clamp);
        assert!(empty.go_to_page(4).is_empty());
        assert_eq!(empty.page(), 0);
    }

    #[test]
    fn empty_dataset_has_no_pages() {
        let p = pager(0, 20);
        assert_eq!(p.total_pages(), 0);
        assert!(p.visible().is_empty());
    }

    #[test]
    fn replace_and_resize_rewind() {
        let mut p = pager(30, 10);
        p.go_to_page(2);
        p.replace((100..105).collect());
        assert_eq!(p.page(), 0);
        assert_eq!(p.visible(), &[100, 101, 102, 103, 104]);

        p.go_to_page(1);
        p.set_page_size(2);
        assert_eq!(p.page(), 0);
        assert_eq!(p.total_pages(), 3);
    }

    #[test]
    fn huge_page_index_does_not_overflow() {
        let mut p = pager(5, 20);
        assert!(p.go_to_page(usize::MAX).is_empty());
        assert!(p.next_page().is_empty());
    }

    #[test]
    fn zero_page_size_is_raised() {
        let p: Pager<u8> = Pager::new(0);
        assert_eq!(p.page_size(), 1);
    }
}
