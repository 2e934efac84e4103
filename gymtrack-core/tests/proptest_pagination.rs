use gymtrack_core::{PageBounds, Pager};
use proptest::prelude::*;

proptest! {
    /// Property: page count is ceil(total / page_size)
    #[test]
    fn prop_page_count(total in 0usize..500, page_size in 1usize..60) {
        let mut pager = Pager::new(page_size);
        pager.replace((0..total).collect::<Vec<_>>());

        let expected = if total == 0 { 0 } else { (total + page_size - 1) / page_size };
        prop_assert_eq!(pager.total_pages(), expected);
    }

    /// Property: concatenating every page in order reproduces the dataset
    #[test]
    fn prop_pages_concatenate_to_items(
        items in prop::collection::vec(any::<u32>(), 0..300),
        page_size in 1usize..40,
    ) {
        let mut pager = Pager::new(page_size);
        pager.replace(items.clone());

        let mut joined = Vec::with_capacity(items.len());
        for page in 0..pager.total_pages() {
            let slice = pager.go_to_page(page);
            prop_assert!(!slice.is_empty());
            prop_assert!(slice.len() <= page_size);
            joined.extend_from_slice(slice);
        }

        prop_assert_eq!(joined, items);
        // One past the last page is empty under the tolerant policy.
        prop_assert!(pager.next_page().is_empty());
    }

    /// Property: page 0 after any navigation is the dataset head
    #[test]
    fn prop_first_page_after_navigation(
        total in 0usize..200,
        page_size in 1usize..30,
        moves in prop::collection::vec(0u8..3, 0..40),
    ) {
        let items: Vec<usize> = (0..total).collect();
        let mut pager = Pager::new(page_size);
        pager.replace(items.clone());

        for m in moves {
            match m {
                0 => { pager.next_page(); }
                1 => { pager.prev_page(); }
                _ => { pager.go_to_page(total); }
            }
        }

        let head = pager.go_to_page(0).to_vec();
        prop_assert_eq!(head, items[..total.min(page_size)].to_vec());
    }

    /// Property: prev_page never goes below zero
    #[test]
    fn prop_prev_page_floor(total in 0usize..100, page_size in 1usize..10, steps in 0usize..20) {
        let mut pager = Pager::new(page_size);
        pager.replace((0..total).collect::<Vec<_>>());
        for _ in 0..steps {
            pager.prev_page();
        }
        prop_assert_eq!(pager.page(), 0);
    }

    /// Property: the clamp policy never yields an empty page for a non-empty dataset
    #[test]
    fn prop_clamp_never_empty(total in 1usize..200, page_size in 1usize..30, target in 0usize..1000) {
        let mut pager = Pager::new(page_size).with_bounds(PageBounds::Clamp);
        pager.replace((0..total).collect::<Vec<_>>());

        prop_assert!(!pager.go_to_page(target).is_empty());
        prop_assert!(pager.page() < pager.total_pages());
    }
}
