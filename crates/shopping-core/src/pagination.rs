//! # Pagination
//!
//! Zero-based page windows over an ordered collection.
//!
//! ```text
//!   items:  [0][1][2][3][4] [5][6]
//!           └── page 0 ───┘ └ page 1 ┘     page_size = 5, total = 7
//!
//!   offset = page × page_size
//!   slice  = [offset, min(offset + page_size, total))
//! ```
//!
//! [`PageRequest`] validates and locates a window; [`PageInfo`] answers the
//! navigation questions a list screen asks (is there a next page, where to
//! go after the last item of a page disappears).

use serde::{Deserialize, Serialize};

use crate::error::{CartError, CartResult, ValidationError};

/// A validated request for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: usize,
    page_size: usize,
}

impl PageRequest {
    /// Validates `page_size > 0`.
    pub fn new(page: usize, page_size: usize) -> CartResult<Self> {
        if page_size == 0 {
            return Err(CartError::InvalidArgument(ValidationError::must_be_positive(
                "page_size",
            )));
        }
        Ok(PageRequest { page, page_size })
    }

    #[inline]
    pub fn page(&self) -> usize {
        self.page
    }

    #[inline]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Index of the first item, or `None` if it does not fit in `usize`
    /// (such a page is past the end of any collection).
    pub fn offset(&self) -> Option<usize> {
        self.page.checked_mul(self.page_size)
    }

    /// Maximum number of items in the page.
    #[inline]
    pub fn limit(&self) -> usize {
        self.page_size
    }

    /// Slices `items` to this page. Empty when the page is past the end.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        match self.offset() {
            Some(from) if from < items.len() => {
                let to = from.saturating_add(self.page_size).min(items.len());
                &items[from..to]
            }
            _ => &[],
        }
    }
}

/// Navigation state of a paged list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
}

impl PageInfo {
    pub fn new(page: usize, page_size: usize, total: usize) -> CartResult<Self> {
        PageRequest::new(page, page_size)?;
        Ok(PageInfo {
            page,
            page_size,
            total,
        })
    }

    /// Number of non-empty pages.
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }

    /// Index of the last page; 0 for an empty collection.
    pub fn last_page(&self) -> usize {
        self.total.saturating_sub(1) / self.page_size
    }

    pub fn has_next(&self) -> bool {
        self.page < self.last_page()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    /// True when the collection does not fit on one page.
    pub fn is_paged(&self) -> bool {
        self.total > self.page_size
    }

    /// State after one item has been removed.
    ///
    /// Stays on the current page unless it was the last page and held only
    /// the removed item, in which case it steps back one page.
    pub fn after_removal(&self) -> PageInfo {
        let total = self.total.saturating_sub(1);
        let shrunk = PageInfo {
            total,
            ..*self
        };
        PageInfo {
            page: self.page.min(shrunk.last_page()),
            ..shrunk
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_zero_page_size_is_invalid() {
        let err = PageRequest::new(0, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(PageInfo::new(0, 0, 3).is_err());
    }

    #[test]
    fn test_slice_windows() {
        let items: Vec<u32> = (0..7).collect();
        let first = PageRequest::new(0, 5).unwrap();
        let second = PageRequest::new(1, 5).unwrap();
        let third = PageRequest::new(2, 5).unwrap();

        assert_eq!(first.slice(&items), &[0, 1, 2, 3, 4]);
        assert_eq!(second.slice(&items), &[5, 6]);
        assert!(third.slice(&items).is_empty());
    }

    #[test]
    fn test_overflowing_offset_is_past_the_end() {
        let items = [1, 2, 3];
        let request = PageRequest::new(usize::MAX, 2).unwrap();
        assert_eq!(request.offset(), None);
        assert!(request.slice(&items).is_empty());
    }

    #[test]
    fn test_navigation() {
        let info = PageInfo::new(0, 5, 12).unwrap();
        assert_eq!(info.page_count(), 3);
        assert_eq!(info.last_page(), 2);
        assert!(info.has_next());
        assert!(!info.has_previous());
        assert!(info.is_paged());

        let empty = PageInfo::new(0, 5, 0).unwrap();
        assert_eq!(empty.page_count(), 0);
        assert_eq!(empty.last_page(), 0);
        assert!(!empty.has_next());
    }

    #[test]
    fn test_after_removal_steps_back_from_emptied_last_page() {
        // 11 items, page 2 holds only item #10
        let info = PageInfo::new(2, 5, 11).unwrap();
        let next = info.after_removal();
        assert_eq!(next.total, 10);
        assert_eq!(next.page, 1);
    }

    #[test]
    fn test_after_removal_keeps_page_otherwise() {
        let info = PageInfo::new(1, 5, 9).unwrap();
        let next = info.after_removal();
        assert_eq!(next.page, 1);
        assert_eq!(next.total, 8);

        let first = PageInfo::new(0, 5, 1).unwrap().after_removal();
        assert_eq!(first.page, 0);
        assert_eq!(first.total, 0);
    }
}
