//! Pagination summary.

use std::ops::Range;

use serde::Serialize;

use super::state::CursorState;

/// Where the current page sits in the result.
///
/// `start` and `end` are 1-based and inclusive; both are 0 when there is
/// nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: usize,
    pub page_size: usize,
    pub total_records: usize,
    pub total_pages: usize,
    pub start: usize,
    pub end: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PaginationInfo {
    /// Pagination over a locally held result of `total_records` rows.
    ///
    /// # Example
    ///
    /// ```
    /// use datagrid_lib::grid::PaginationInfo;
    ///
    /// let info = PaginationInfo::client(2, 10, 25);
    /// assert_eq!((info.start, info.end, info.total_pages), (11, 20, 3));
    /// assert!(info.has_next && info.has_previous);
    /// ```
    pub fn client(current_page: usize, page_size: usize, total_records: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_records.div_ceil(page_size).max(1);
        let current_page = current_page.clamp(1, total_pages);
        let (start, end) = if total_records == 0 {
            (0, 0)
        } else {
            ((current_page - 1) * page_size + 1, (current_page * page_size).min(total_records))
        };

        Self {
            current_page,
            page_size,
            total_records,
            total_pages,
            start,
            end,
            has_next: current_page < total_pages,
            has_previous: current_page > 1,
        }
    }

    /// Pagination for a server page of `loaded` rows.
    ///
    /// When the server reports no count, the total is what has been seen so
    /// far and one more page is assumed while the server says there is more.
    pub fn server(current_page: usize, page_size: usize, loaded: usize, cursor: &CursorState) -> Self {
        let page_size = page_size.max(1);
        let current_page = current_page.max(1);
        let offset = (current_page - 1) * page_size;

        let (total_records, total_pages) = if cursor.total_records > 0 {
            let total = cursor.total_records;
            (total, total.div_ceil(page_size).max(current_page))
        } else {
            (offset + loaded, current_page + usize::from(cursor.has_more))
        };
        let (start, end) = if loaded == 0 {
            (0, 0)
        } else {
            (offset + 1, offset + loaded)
        };

        Self {
            current_page,
            page_size,
            total_records,
            total_pages,
            start,
            end,
            has_next: cursor.has_more,
            has_previous: current_page > 1,
        }
    }

    /// Zero-based index range of the current page within the full result.
    pub fn slice_range(&self) -> Range<usize> {
        if self.start == 0 { 0..0 } else { self.start - 1..self.end }
    }
}
