//! Page-walking rules shared by the HTTP listing providers.

/// Largest page the listing endpoints serve; bigger requests are cut down
/// to this many rows.
pub(crate) const MAX_PAGE_SIZE: usize = 100;

/// Page size actually requested for a configured size.
pub(crate) fn effective_page_size(configured: usize) -> usize {
    configured.clamp(1, MAX_PAGE_SIZE)
}

/// Whether paging stops after a page of `page_len` rows.
///
/// An empty page always ends the walk. With a reported `total`, paging
/// continues until `fetched` reaches it, whatever the page lengths.
/// Without one, a page shorter than `requested` is the last.
pub(crate) fn is_last_page(
    page_len: usize,
    requested: usize,
    fetched: usize,
    total: Option<usize>,
) -> bool {
    if page_len == 0 {
        return true;
    }
    match total {
        Some(total) if total > 0 => fetched >= total,
        _ => page_len < requested,
    }
}
