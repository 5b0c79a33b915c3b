//! Paginated envelope shared with the REST backend.

use serde::{Deserialize, Serialize};

use crate::display::DisplayRange;
use crate::request::PageRequest;

/// One page of a collection plus the totals needed to render pager controls.
///
/// The JSON shape matches the backend's list responses:
/// `{"data": [...], "total": n, "page": p, "per_page": s, "total_pages": t}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Number of rows across all pages.
    pub total: usize,
    /// One-based page number.
    pub page: usize,
    /// Requested page size.
    pub per_page: usize,
    /// Number of pages for `total` rows at `per_page`.
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    /// Caption range for this page.
    #[must_use]
    pub fn display_range(&self) -> DisplayRange {
        DisplayRange::new(self.page, self.per_page, self.total)
    }

    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Map rows while keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

/// Slice `items` down to the requested page.
///
/// The returned slice always matches the requested page and page size. Pages
/// past the end are empty but still report the real totals.
pub fn paginate<T>(items: impl IntoIterator<Item = T>, request: PageRequest) -> Paginated<T> {
    let all: Vec<T> = items.into_iter().collect();
    let total = all.len();
    let data = all
        .into_iter()
        .skip(request.offset())
        .take(request.per_page())
        .collect();
    Paginated {
        data,
        total,
        page: request.page(),
        per_page: request.per_page(),
        total_pages: total.div_ceil(request.per_page()),
    }
}
