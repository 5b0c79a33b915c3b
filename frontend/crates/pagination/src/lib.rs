//! Page slicing, paginated envelopes and list search primitives.
//!
//! Every list view in the hospital frontend (users, departments, doctors,
//! patients, appointments, medical records, schedules) shares the same
//! behaviour: narrow the collection with a free-text query, then show one
//! page of it together with a "Showing x-y of n items" caption. This crate
//! keeps that behaviour pure so views and adapters can share it.
//!
//! # Example
//!
//! ```
//! use pagination::{PageRequest, paginate};
//!
//! let request = PageRequest::new(2, 10).expect("valid page request");
//! let page = paginate((1..=25).collect::<Vec<u32>>(), request);
//!
//! assert_eq!(page.data, (11..=20).collect::<Vec<u32>>());
//! assert_eq!(page.total_pages, 3);
//! assert_eq!(page.display_range().to_string(), "Showing 11-20 of 25 items");
//! ```

mod display;
mod envelope;
mod request;
mod search;

pub use display::DisplayRange;
pub use envelope::{Paginated, paginate};
pub use request::{DEFAULT_PER_PAGE, PageRequest, PageRequestError, ROWS_PER_PAGE_OPTIONS};
pub use search::{Searchable, filter_by_query, matches_query};
