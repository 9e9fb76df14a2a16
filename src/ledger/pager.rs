use serde::Serialize;

/// Pagination metadata for one page of a list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationWindow {
    pub current_page: usize,
    pub total_pages: usize,
    #[serde(rename = "totalTransactions")]
    pub total_entries: usize,
    pub page_size: usize,
    #[serde(rename = "hasNextPage")]
    pub has_next: bool,
    #[serde(rename = "hasPreviousPage")]
    pub has_previous: bool,
}

/// Slice `entries` to the requested 1-based page.
///
/// `page` is echoed back as given; a page past the end yields an empty slice.
/// Callers reject `page == 0` and `page_size == 0`; here they degrade to the
/// first page and an empty window respectively.
pub fn paginate<T>(entries: Vec<T>, page: usize, page_size: usize) -> (Vec<T>, PaginationWindow) {
    let total_entries = entries.len();
    let total_pages = if page_size == 0 {
        0
    } else {
        total_entries.div_ceil(page_size)
    };

    let start = page.saturating_sub(1).saturating_mul(page_size);
    let slice: Vec<T> = entries.into_iter().skip(start).take(page_size).collect();

    let window = PaginationWindow {
        current_page: page,
        total_pages,
        total_entries,
        page_size,
        has_next: page < total_pages,
        has_previous: page > 1,
    };

    (slice, window)
}
