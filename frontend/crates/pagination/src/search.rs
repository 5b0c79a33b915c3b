//! Free-text narrowing of list rows.

/// Rows that can be matched against a search box query.
pub trait Searchable {
    /// Text fields the query is matched against.
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for String {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.as_str()]
    }
}

impl Searchable for &str {
    fn search_fields(&self) -> Vec<&str> {
        vec![*self]
    }
}

/// Whether any search field contains `query`, ignoring case.
///
/// A blank query matches every row.
pub fn matches_query<T: Searchable + ?Sized>(item: &T, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    item.search_fields()
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Keep rows matching `query`, preserving their order.
pub fn filter_by_query<T: Searchable>(items: impl IntoIterator<Item = T>, query: &str) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| matches_query(item, query))
        .collect()
}
