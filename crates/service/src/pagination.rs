//! Pagination utilities for service layer
//!
//! `Pagination` normalizes request parameters; `Page` is the response
//! envelope (`content`, `totalElements`, `totalPages`, ...).

use serde::Serialize;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 0-based page index
    pub page: u64,
    /// items per page
    pub per_page: u64,
}

impl Pagination {
    pub fn new(page: u64, per_page: u64) -> Self { Self { page, per_page } }

    /// Clamp page size to 1..=100
    pub fn normalize(self) -> (u64, u64) {
        (self.page, self.per_page.clamp(1, 100))
    }

    /// Row offset of the first item, `None` when it does not fit a SQL BIGINT.
    pub fn offset(self) -> Option<u64> {
        let (page, per_page) = self.normalize();
        page.checked_mul(per_page).filter(|o| *o <= i64::MAX as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 0, per_page: 20 } }
}

/// One page of results plus the totals needed by a pager.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u64,
    pub size: u64,
    pub number_of_elements: u64,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: Pagination, total_elements: u64, total_pages: u64) -> Self {
        let (number, size) = request.normalize();
        let number_of_elements = content.len() as u64;
        Self {
            empty: content.is_empty(),
            content,
            total_elements,
            total_pages,
            number,
            size,
            number_of_elements,
            first: number == 0,
            last: number.saturating_add(1) >= total_pages,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
            number_of_elements: self.number_of_elements,
            first: self.first,
            last: self.last,
            empty: self.empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Page, Pagination};

    #[test]
    fn normalize_clamps_zero_size() {
        let (idx, per) = Pagination { page: 0, per_page: 0 }.normalize();
        assert_eq!(idx, 0);
        assert_eq!(per, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (idx, per) = Pagination { page: 5, per_page: 1000 }.normalize();
        assert_eq!(idx, 5);
        assert_eq!(per, 100);
    }

    #[test]
    fn page_flags_follow_position() {
        let p = Page::new(vec![1, 2, 3, 4], Pagination::new(0, 4), 6, 2);
        assert!(p.first && !p.last && !p.empty);
        assert_eq!(p.number_of_elements, 4);

        let p = Page::new(vec![5, 6], Pagination::new(1, 4), 6, 2);
        assert!(!p.first && p.last);

        let p: Page<i32> = Page::new(vec![], Pagination::new(0, 4), 0, 0);
        assert!(p.first && p.last && p.empty);
    }

    #[test]
    fn offset_rejects_overflowing_pages() {
        assert_eq!(Pagination::new(3, 4).offset(), Some(12));
        assert_eq!(Pagination::new(u64::MAX, 4).offset(), None);
        assert_eq!(Pagination::new(u64::MAX / 2, 4).offset(), None);
        assert_eq!(Pagination::new(i64::MAX as u64, 1).offset(), Some(i64::MAX as u64));
    }

    #[test]
    fn last_flag_at_max_page_number() {
        let p: Page<i32> = Page::new(vec![], Pagination::new(u64::MAX, 4), 3, 1);
        assert!(p.last && p.empty && !p.first);
    }

    #[test]
    fn page_serializes_camel_case() {
        let p = Page::new(vec!["a"], Pagination::new(0, 4), 1, 1).map(str::to_uppercase);
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["content"][0], "A");
        assert_eq!(v["totalElements"], 1);
        assert_eq!(v["numberOfElements"], 1);
    }
}
