//! # Listing Pagination
//!
//! Fixed-size pagination for product listings. Nine items per page,
//! matching the storefront grid.

use serde::Serialize;

/// Items shown per listing page
pub const PAGE_SIZE: usize = 9;

/// One page of a listing
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number after clamping
    pub number: u32,
    pub total_pages: u32,
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Paginate `items` and return the requested page.
///
/// Returns `None` when there are no items at all: "no products" is a
/// distinct display state, not an empty page. Out-of-range page numbers
/// (including 0) clamp to the nearest valid page.
pub fn paginate<T: Clone>(items: &[T], requested: u32) -> Option<Page<T>> {
    if items.is_empty() {
        return None;
    }

    let total_items = items.len();
    let total_pages = total_items.div_ceil(PAGE_SIZE) as u32;
    let number = requested.clamp(1, total_pages);

    let start = (number as usize - 1) * PAGE_SIZE;
    let end = (start + PAGE_SIZE).min(total_items);

    Some(Page {
        items: items[start..end].to_vec(),
        number,
        total_pages,
        total_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_listing_is_none() {
        let items: Vec<u32> = vec![];
        assert!(paginate(&items, 1).is_none());
    }

    #[test]
    fn test_twenty_items_yield_three_pages() {
        let items: Vec<u32> = (0..20).collect();

        let first = paginate(&items, 1).unwrap();
        let second = paginate(&items, 2).unwrap();
        let third = paginate(&items, 3).unwrap();

        assert_eq!(first.len(), 9);
        assert_eq!(second.len(), 9);
        assert_eq!(third.len(), 2);
        assert_eq!(first.total_pages, 3);
        assert_eq!(third.items, vec![18, 19]);
    }

    #[test]
    fn test_out_of_range_page_clamps() {
        let items: Vec<u32> = (0..20).collect();

        let overflow = paginate(&items, 99).unwrap();
        assert_eq!(overflow.number, 3);
        assert_eq!(overflow.len(), 2);

        let zero = paginate(&items, 0).unwrap();
        assert_eq!(zero.number, 1);
        assert_eq!(zero.len(), 9);
    }

    #[test]
    fn test_exact_multiple_of_page_size() {
        let items: Vec<u32> = (0..18).collect();
        let page = paginate(&items, 2).unwrap();

        assert_eq!(page.total_pages, 2);
        assert_eq!(page.len(), 9);
    }
}
