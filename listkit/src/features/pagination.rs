//! Client-side paging over the filtered, sorted rows.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::feature::{FeatureApi, FeatureBuild, FeatureDescriptor, UiContract};
use crate::state::Slice;

use super::{FILTERS, PAGINATION, SORTING};

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Pagination slice. Page indices are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    /// Current page.
    pub page_index: usize,
    /// Rows per page.
    pub page_size: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationState {
    /// Number of pages needed for `total` rows. Never less than one.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size.max(1)).max(1)
    }

    fn window<T>(&self, rows: Vec<T>) -> Vec<T> {
        let size = self.page_size.max(1);
        rows.into_iter()
            .skip(self.page_index.saturating_mul(size))
            .take(size)
            .collect()
    }
}

/// Public API of the pagination feature.
pub struct PaginationApi {
    slice: Slice<PaginationState>,
}

impl PaginationApi {
    /// Jump to `index`.
    pub fn set_page_index(&self, index: usize) {
        self.slice.update(|s| s.page_index = index);
    }

    /// Change the page size and go back to the first page. Zero is treated
    /// as one.
    pub fn set_page_size(&self, size: usize) {
        self.slice.set(PaginationState {
            page_index: 0,
            page_size: size.max(1),
        });
    }

    /// Advance one page.
    pub fn next_page(&self) {
        self.slice.update(|s| s.page_index = s.page_index.saturating_add(1));
    }

    /// Go back one page, stopping at the first.
    pub fn prev_page(&self) {
        self.slice.update(|s| s.page_index = s.page_index.saturating_sub(1));
    }

    /// The current slice.
    pub fn state(&self) -> PaginationState {
        self.slice.get()
    }

    /// Pages needed for `total` rows at the current size.
    pub fn page_count(&self, total: usize) -> usize {
        self.state().page_count(total)
    }
}

impl FeatureApi for PaginationApi {
    fn handlers(&self) -> Vec<&'static str> {
        vec!["set_page_index", "set_page_size", "next_page", "prev_page"]
    }
}

/// The pagination feature. Runs after filters and sorting when those are
/// registered.
pub fn pagination(initial: PaginationState) -> FeatureDescriptor {
    FeatureDescriptor::new(PAGINATION, move |cx| {
        let slice = cx.slice(initial);
        let api = Arc::new(PaginationApi {
            slice: slice.clone(),
        });
        Ok(FeatureBuild::with_api(api)
            .derive(move |rows, dx| slice.read(dx.state()).window(rows)))
    })
    .after([FILTERS, SORTING])
    .ui(UiContract::new()
        .slot("Pagination")
        .requires("set_page_index")
        .requires("set_page_size"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window() {
        let state = PaginationState {
            page_index: 2,
            page_size: 10,
        };
        let rows: Vec<u32> = (0..25).collect();
        assert_eq!(state.window(rows), (20..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_window_past_end_is_empty() {
        let state = PaginationState {
            page_index: 9,
            page_size: 10,
        };
        assert!(state.window((0..5).collect::<Vec<u32>>()).is_empty());
    }

    #[test]
    fn test_page_count() {
        let state = PaginationState::default();
        assert_eq!(state.page_count(0), 1);
        assert_eq!(state.page_count(10), 1);
        assert_eq!(state.page_count(11), 2);
    }
}
