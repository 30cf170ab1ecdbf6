//! Page-based pagination (`?page=N`, fixed page size).

use serde::Serialize;

const MAX_OFFSET: u64 = i64::MAX as u64;

/// A request for one page of a listing. Pages are 1-based.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    per_page: u64,
}

impl PageRequest {
    /// Build a request; a missing or zero page becomes page 1 and the page
    /// size is at least 1.
    ///
    /// The page is capped so that the row offset always fits in an `i64`.
    pub fn new(page: Option<u64>, per_page: u64) -> Self {
        let per_page = per_page.max(1);
        let max_page = MAX_OFFSET / per_page + 1;
        Self {
            page: page.unwrap_or(1).clamp(1, max_page),
            per_page,
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// One page of items plus the total row count of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    pub fn last_page(&self) -> u64 {
        self.total.div_ceil(self.request.per_page).max(1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }

    /// Render the page as a response body; `path` is the listing URL used to
    /// build navigation links.
    pub fn into_body(self, path: &str) -> PageBody<T> {
        let current = self.request.page;
        let last = self.last_page();
        let link = |page: u64| format!("{path}?page={page}");

        let (from, to) = if self.items.is_empty() {
            (None, None)
        } else {
            let from = self.request.offset() + 1;
            (Some(from), Some(from + self.items.len() as u64 - 1))
        };

        PageBody {
            links: PageLinks {
                first: link(1),
                last: link(last),
                prev: (current > 1).then(|| link(current - 1)),
                next: (current < last).then(|| link(current + 1)),
            },
            meta: PageMeta {
                current_page: current,
                from,
                last_page: last,
                path: path.to_string(),
                per_page: self.request.per_page,
                to,
                total: self.total,
            },
            data: self.items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageBody<T> {
    pub data: Vec<T>,
    pub links: PageLinks,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub first: String,
    pub last: String,
    pub prev: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub current_page: u64,
    pub from: Option<u64>,
    pub last_page: u64,
    pub path: String,
    pub per_page: u64,
    pub to: Option<u64>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_clamps_page_and_size() {
        let req = PageRequest::new(Some(0), 0);
        assert_eq!(req.page(), 1);
        assert_eq!(req.per_page(), 1);
        assert_eq!(req.offset(), 0);

        let req = PageRequest::new(Some(4), 1);
        assert_eq!(req.offset(), 3);
    }

    #[test]
    fn huge_pages_keep_the_offset_in_i64_range() {
        for per_page in [1, 7, 1000] {
            let req = PageRequest::new(Some(u64::MAX), per_page);
            assert!(i64::try_from(req.offset()).is_ok());
            assert!(req.page() > 1);
        }
    }

    #[test]
    fn middle_page_links_both_ways() {
        let page = Page::new(vec!["b"], 3, PageRequest::new(Some(2), 1));
        let body = page.into_body("/artists");

        assert_eq!(body.data, vec!["b"]);
        assert_eq!(body.links.first, "/artists?page=1");
        assert_eq!(body.links.last, "/artists?page=3");
        assert_eq!(body.links.prev.as_deref(), Some("/artists?page=1"));
        assert_eq!(body.links.next.as_deref(), Some("/artists?page=3"));
        assert_eq!(body.meta.from, Some(2));
        assert_eq!(body.meta.to, Some(2));
        assert_eq!(body.meta.total, 3);
    }

    #[test]
    fn empty_listing_has_one_page_and_no_range() {
        let page: Page<u8> = Page::new(vec![], 0, PageRequest::new(None, 1));
        let body = page.into_body("/artists");

        assert_eq!(body.meta.last_page, 1);
        assert_eq!(body.meta.from, None);
        assert_eq!(body.meta.to, None);
        assert!(body.links.prev.is_none());
        assert!(body.links.next.is_none());
    }

    #[test]
    fn page_past_the_end_is_empty_but_keeps_total() {
        let page: Page<u8> = Page::new(vec![], 2, PageRequest::new(Some(9), 1));
        let body = page.into_body("/artists");

        assert!(body.data.is_empty());
        assert_eq!(body.meta.total, 2);
        assert_eq!(body.meta.last_page, 2);
        assert!(body.links.next.is_none());
    }
}
