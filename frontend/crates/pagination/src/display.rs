//! "Showing x-y of n items" captions.

use std::fmt;

/// Inclusive one-based row range shown under a list.
///
/// A page with no rows (an empty collection, or a page past the end) reports
/// `0-0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRange {
    /// First row on the page, one-based.
    pub start: usize,
    /// Last row on the page, one-based and inclusive.
    pub end: usize,
    /// Rows across all pages.
    pub total: usize,
}

impl DisplayRange {
    /// Compute the range for `page` (one-based) at `per_page` rows.
    #[must_use]
    pub fn new(page: usize, per_page: usize, total: usize) -> Self {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        if offset >= total || per_page == 0 {
            return Self {
                start: 0,
                end: 0,
                total,
            };
        }
        Self {
            start: offset.saturating_add(1),
            end: page.saturating_mul(per_page).min(total),
            total,
        }
    }
}

impl fmt::Display for DisplayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showing {}-{} of {} items",
            self.start, self.end, self.total
        )
    }
}
