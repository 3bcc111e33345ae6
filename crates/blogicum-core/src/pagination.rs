//! Page-based slicing of listings.
//!
//! Out-of-range requests are clamped rather than rejected: a missing or
//! malformed page number means the first page, and a number below one or past
//! the end means the last page. An empty listing still has one (empty) page.

use serde::Serialize;

/// A page number as requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageNumber {
    #[default]
    First,
    Requested(i64),
}

impl PageNumber {
    /// Parse the raw `page` query value.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim).and_then(|value| value.parse::<i64>().ok()) {
            Some(number) => Self::Requested(number),
            None => Self::First,
        }
    }

    /// The 1-based page to serve given `total_pages` (at least one).
    pub fn resolve(self, total_pages: u64) -> u64 {
        let last = total_pages.max(1);
        match self {
            Self::First => 1,
            Self::Requested(number) => match u64::try_from(number) {
                Ok(number) if (1..=last).contains(&number) => number,
                _ => last,
            },
        }
    }
}

/// Which slice of a listing to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: PageNumber,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(number: PageNumber, per_page: u64) -> Self {
        Self {
            number,
            per_page: per_page.max(1),
        }
    }

    pub fn first(per_page: u64) -> Self {
        Self::new(PageNumber::First, per_page)
    }

    pub fn total_pages(&self, total_items: u64) -> u64 {
        total_items.div_ceil(self.per_page).max(1)
    }

    /// The page actually served for a listing of `total_items`.
    pub fn resolve(&self, total_items: u64) -> u64 {
        self.number.resolve(self.total_pages(total_items))
    }

    /// Number of items preceding page `number`.
    pub fn offset(&self, number: u64) -> u64 {
        number.saturating_sub(1) * self.per_page
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub per_page: u64,
    pub total_items: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, per_page: u64, total_items: u64) -> Self {
        Self {
            items,
            number,
            per_page,
            total_items,
        }
    }

    /// Slice an already filtered and ordered sequence.
    pub fn from_items<I>(items: I, request: PageRequest) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let all: Vec<T> = items.into_iter().collect();
        let total_items = all.len() as u64;
        let number = request.resolve(total_items);
        let skip = usize::try_from(request.offset(number)).unwrap_or(usize::MAX);
        let take = usize::try_from(request.per_page).unwrap_or(usize::MAX);
        let items = all.into_iter().skip(skip).take(take).collect();

        Self::new(items, number, request.per_page, total_items)
    }

    pub fn total_pages(&self) -> u64 {
        self.total_items.div_ceil(self.per_page.max(1)).max(1)
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            per_page: self.per_page,
            total_items: self.total_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of_23(raw: Option<&str>) -> Page<u32> {
        Page::from_items(1..=23, PageRequest::new(PageNumber::parse(raw), 10))
    }

    #[test]
    fn test_twenty_three_items_make_three_pages() {
        let sizes: Vec<usize> = ["1", "2", "3"]
            .into_iter()
            .map(|raw| page_of_23(Some(raw)).items.len())
            .collect();

        assert_eq!(sizes, vec![10, 10, 3]);
        assert_eq!(page_of_23(None).total_pages(), 3);
    }

    #[test]
    fn test_page_past_the_end_is_clamped_to_last() {
        let page = page_of_23(Some("4"));
        assert_eq!(page.number, 3);
        assert_eq!(page.items, vec![21, 22, 23]);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_malformed_page_means_first() {
        for raw in [None, Some(""), Some("abc"), Some("1.5")] {
            let page = page_of_23(raw);
            assert_eq!(page.number, 1);
            assert_eq!(page.items.first(), Some(&1));
        }
    }

    #[test]
    fn test_page_below_one_means_last() {
        assert_eq!(page_of_23(Some("0")).number, 3);
        assert_eq!(page_of_23(Some("-2")).number, 3);
    }

    #[test]
    fn test_empty_listing_has_one_empty_page() {
        let page: Page<u32> = Page::from_items(Vec::new(), PageRequest::new(PageNumber::Requested(5), 10));
        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages(), 1);
        assert!(page.items.is_empty());
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_offset() {
        let request = PageRequest::first(5);
        assert_eq!(request.offset(1), 0);
        assert_eq!(request.offset(3), 10);
    }
}
