//! Page types for REST collection endpoints
//!
//! Mirrors the platform's list envelope:
//! `{ pageIndex, pageSize, totalPages, totalHits, content: [...] }`.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 200;

/// One window of a server-paginated collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Rows in server order
    pub data: Vec<T>,
    /// Zero-based page number
    pub index: u32,
    /// Requested page length
    pub size: u32,
    /// Entities across all pages
    pub total_count: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, index: u32, size: u32, total_count: u64) -> Self {
        debug_assert!(data.len() <= size as usize || size == 0);
        Self {
            data,
            index,
            size,
            total_count,
        }
    }

    /// A page with no rows, used before the first fetch resolves
    pub fn empty(size: u32) -> Self {
        Self::new(Vec::new(), 0, size, 0)
    }

    /// `ceil(total_count / size)`
    pub fn total_pages(&self) -> u32 {
        if self.size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.size as u64) as u32
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            index: self.index,
            size: self.size,
            total_count: self.total_count,
        }
    }
}

/// List response envelope as returned by the REST API
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    #[serde(default)]
    pub page_index: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_hits: Option<u64>,
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
}

impl<T> From<PageEnvelope<T>> for Page<T> {
    fn from(envelope: PageEnvelope<T>) -> Self {
        let seen = envelope.page_index as u64 * envelope.page_size as u64
            + envelope.content.len() as u64;
        // Without totalHits the count is exact on the last page only
        let total_count = match envelope.total_hits {
            Some(hits) => hits.max(seen),
            None if envelope.page_index + 1 >= envelope.total_pages => seen,
            None => (envelope.total_pages as u64 * envelope.page_size as u64).max(seen),
        };
        let size = envelope.page_size.max(envelope.content.len() as u32);

        Page {
            data: envelope.content,
            index: envelope.page_index,
            size,
            total_count,
        }
    }
}

/// Parameters of a list call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub index: u32,
    pub size: u32,
    /// RSQL filter expression
    pub q: Option<String>,
    /// Rendered sort expression
    pub sort: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            index: 0,
            size: DEFAULT_PAGE_SIZE,
            q: None,
            sort: None,
        }
    }
}

impl PageRequest {
    pub fn new(index: u32, size: u32) -> Self {
        Self {
            index,
            size: size.clamp(1, MAX_PAGE_SIZE),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        let q = q.into();
        self.q = if q.is_empty() { None } else { Some(q) };
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        let sort = sort.into();
        self.sort = if sort.is_empty() { None } else { Some(sort) };
        self
    }

    /// Same filter and sort, different page
    pub fn at(&self, index: u32) -> Self {
        Self {
            index,
            ..self.clone()
        }
    }

    /// Query string pairs in the order the API documents them
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("pageIndex", self.index.to_string()),
            ("pageSize", self.size.to_string()),
        ];
        if let Some(q) = &self.q {
            pairs.push(("q", q.clone()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_third_page_of_hundred_twenty() {
        let envelope: PageEnvelope<u32> = PageEnvelope {
            page_index: 2,
            page_size: 25,
            total_pages: 5,
            total_hits: Some(120),
            content: (50..75).collect(),
        };

        let page: Page<u32> = envelope.into();
        assert_eq!(page.total_count, 120);
        assert_eq!(page.index, 2);
        assert_eq!(page.len(), 25);
        assert_eq!(page.total_pages(), 5);
        assert!(page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_envelope_without_total_hits() {
        let json = serde_json::json!({
            "pageIndex": 0,
            "pageSize": 10,
            "totalPages": 3,
            "content": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]
        });
        let envelope: PageEnvelope<u32> = serde_json::from_value(json).unwrap();
        let page = Page::from(envelope);
        assert_eq!(page.total_count, 30);
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_last_envelope_without_total_hits_counts_rows() {
        let single: PageEnvelope<u32> = serde_json::from_value(serde_json::json!({
            "pageIndex": 0,
            "pageSize": 20,
            "totalPages": 1,
            "content": [7]
        }))
        .unwrap();
        let page = Page::from(single);
        assert_eq!(page.total_count, 1);
        assert_eq!(page.total_pages(), 1);

        let last: PageEnvelope<u32> = PageEnvelope {
            page_index: 4,
            page_size: 25,
            total_pages: 5,
            total_hits: None,
            content: (100..120).collect(),
        };
        let page = Page::from(last);
        assert_eq!(page.total_count, 120);
        assert_eq!(page.total_pages(), 5);
        assert!(!page.has_next());
    }

    #[test]
    fn test_last_page_is_short() {
        let page = Page::new(vec![1, 2], 4, 25, 102);
        assert_eq!(page.total_pages(), 5);
        assert!(!page.has_next());
    }

    #[test]
    fn test_zero_size_page() {
        let page: Page<u8> = Page::empty(0);
        assert_eq!(page.total_pages(), 0);
        assert!(!page.has_next());
    }

    #[test]
    fn test_page_request_pairs() {
        let request = PageRequest::new(1, 50)
            .with_query("status==BUILDING")
            .with_sort("=desc=submitTime");

        assert_eq!(
            request.query_pairs(),
            vec![
                ("pageIndex", "1".to_string()),
                ("pageSize", "50".to_string()),
                ("q", "status==BUILDING".to_string()),
                ("sort", "=desc=submitTime".to_string()),
            ]
        );
        assert_eq!(request.at(3).index, 3);
        assert_eq!(request.at(3).q, request.q);
    }

    #[test]
    fn test_page_request_clamps_size() {
        assert_eq!(PageRequest::new(0, 0).size, 1);
        assert_eq!(PageRequest::new(0, 10_000).size, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::default().with_query("").q, None);
    }
}
