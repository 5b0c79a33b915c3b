//! Validated page requests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page sizes offered by list views.
pub const ROWS_PER_PAGE_OPTIONS: [usize; 4] = [10, 25, 50, 100];

/// Page size used when a caller does not choose one.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Errors raised when a page request is out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Pages are numbered from one.
    #[error("page must be at least 1, got {page}")]
    PageOutOfRange {
        /// Requested page.
        page: usize,
    },
    /// A page must hold at least one row.
    #[error("per_page must be at least 1, got {per_page}")]
    PerPageOutOfRange {
        /// Requested page size.
        per_page: usize,
    },
}

/// One-based page number and page size.
///
/// ## Invariants
/// - `page >= 1`
/// - `per_page >= 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PageRequestDto", into = "PageRequestDto")]
pub struct PageRequest {
    page: usize,
    per_page: usize,
}

impl PageRequest {
    /// Validate and build a page request.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when either value is zero.
    pub const fn new(page: usize, per_page: usize) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::PageOutOfRange { page });
        }
        if per_page == 0 {
            return Err(PageRequestError::PerPageOutOfRange { per_page });
        }
        Ok(Self { page, per_page })
    }

    /// First page with the given size, or the default size when zero.
    #[must_use]
    pub const fn first(per_page: usize) -> Self {
        let size = if per_page == 0 {
            DEFAULT_PER_PAGE
        } else {
            per_page
        };
        Self {
            page: 1,
            per_page: size,
        }
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Number of rows per page.
    #[must_use]
    pub const fn per_page(&self) -> usize {
        self.per_page
    }

    /// Zero-based index of the first row on this page.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Same page size, different page.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::PageOutOfRange`] when `page` is zero.
    pub const fn with_page(self, page: usize) -> Result<Self, PageRequestError> {
        Self::new(page, self.per_page)
    }

    /// Switch page size and go back to the first page, as list views do when
    /// the rows-per-page selector changes.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::PerPageOutOfRange`] when `per_page` is zero.
    pub const fn with_per_page(self, per_page: usize) -> Result<Self, PageRequestError> {
        Self::new(1, per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PER_PAGE)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PageRequestDto {
    page: usize,
    per_page: usize,
}

impl From<PageRequest> for PageRequestDto {
    fn from(value: PageRequest) -> Self {
        Self {
            page: value.page,
            per_page: value.per_page,
        }
    }
}

impl TryFrom<PageRequestDto> for PageRequest {
    type Error = PageRequestError;

    fn try_from(value: PageRequestDto) -> Result<Self, Self::Error> {
        Self::new(value.page, value.per_page)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for page request validation.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10, PageRequestError::PageOutOfRange { page: 0 })]
    #[case(1, 0, PageRequestError::PerPageOutOfRange { per_page: 0 })]
    fn rejects_zero_values(
        #[case] page: usize,
        #[case] per_page: usize,
        #[case] expected: PageRequestError,
    ) {
        let err = PageRequest::new(page, per_page).expect_err("zero values must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case(1, 10, 0)]
    #[case(3, 25, 50)]
    fn offset_counts_rows_before_the_page(
        #[case] page: usize,
        #[case] per_page: usize,
        #[case] offset: usize,
    ) {
        let request = PageRequest::new(page, per_page).expect("valid request");
        assert_eq!(request.offset(), offset);
    }

    #[rstest]
    fn changing_page_size_resets_to_first_page() {
        let request = PageRequest::new(4, 10).expect("valid request");
        let resized = request.with_per_page(50).expect("valid size");
        assert_eq!(resized.page(), 1);
        assert_eq!(resized.per_page(), 50);
    }

    #[rstest]
    fn deserialising_rejects_page_zero() {
        let result = serde_json::from_str::<PageRequest>(r#"{"page":0,"per_page":10}"#);
        assert!(result.is_err(), "page zero must not deserialise");
    }

    #[rstest]
    fn first_falls_back_to_default_size() {
        assert_eq!(PageRequest::first(0).per_page(), DEFAULT_PER_PAGE);
        assert_eq!(PageRequest::default().page(), 1);
    }
}
