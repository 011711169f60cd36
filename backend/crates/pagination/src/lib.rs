//! Page-based pagination primitives shared by backend endpoints.
//!
//! The crate covers three concerns:
//!
//! - clamping raw query parameters into an always-valid [`PageRequest`];
//! - page arithmetic ([`total_pages`]);
//! - the [`PageMetadata`] envelope serialised into the [`X_PAGINATION`]
//!   response header, including previous/next navigation links.

use serde::{Deserialize, Serialize};

/// Page number used when the caller supplies none.
pub const DEFAULT_PAGE_NUMBER: u32 = 1;
/// Page size used when the caller supplies none.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Smallest page size a caller can obtain.
pub const MIN_PAGE_SIZE: u32 = 1;
/// Largest page size a caller can obtain.
pub const MAX_PAGE_SIZE: u32 = 20;

/// Name of the response header carrying serialised [`PageMetadata`].
pub const X_PAGINATION: &str = "X-Pagination";

/// A clamped, always-valid page request.
///
/// Out-of-range input is clamped rather than rejected: the page number
/// floors at [`DEFAULT_PAGE_NUMBER`] and the page size is forced into
/// `[MIN_PAGE_SIZE, MAX_PAGE_SIZE]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: u32,
    size: u32,
}

impl PageRequest {
    /// Clamp raw query parameters into a valid request.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageRequest;
    ///
    /// let page = PageRequest::from_raw(Some(0), Some(100));
    /// assert_eq!(page.number(), 1);
    /// assert_eq!(page.size(), 20);
    /// ```
    #[must_use]
    pub fn from_raw(number: Option<i64>, size: Option<i64>) -> Self {
        Self {
            number: clamp_number(number),
            size: clamp_size(size),
        }
    }

    /// 1-indexed page number.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Number of records per page.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            number: DEFAULT_PAGE_NUMBER,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn clamp_number(raw: Option<i64>) -> u32 {
    match raw {
        None => DEFAULT_PAGE_NUMBER,
        Some(n) if n < i64::from(DEFAULT_PAGE_NUMBER) => DEFAULT_PAGE_NUMBER,
        Some(n) => u32::try_from(n).unwrap_or(u32::MAX),
    }
}

fn clamp_size(raw: Option<i64>) -> u32 {
    match raw {
        None => DEFAULT_PAGE_SIZE,
        Some(n) if n < i64::from(MIN_PAGE_SIZE) => MIN_PAGE_SIZE,
        Some(n) if n > i64::from(MAX_PAGE_SIZE) => MAX_PAGE_SIZE,
        Some(n) => u32::try_from(n).unwrap_or(MAX_PAGE_SIZE),
    }
}

/// Number of pages needed to hold `total_count` records.
///
/// A zero `page_size` is treated as one record per page so the function
/// stays total; [`PageRequest`] never produces zero.
#[must_use]
pub fn total_pages(total_count: u64, page_size: u32) -> u64 {
    let size = u64::from(page_size.max(MIN_PAGE_SIZE));
    total_count.div_ceil(size)
}

/// Navigation link for one page of a collection.
fn page_link(base_path: &str, number: u32, size: u32) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("pageNumber", &number.to_string())
        .append_pair("pageSize", &size.to_string())
        .finish();
    format!("{base_path}?{query}")
}

/// Failures when preparing pagination metadata for transport.
#[derive(Debug, thiserror::Error)]
pub enum PaginationError {
    /// The metadata could not be serialised into a header value.
    #[error("failed to serialise pagination metadata: {0}")]
    Serialise(#[from] serde_json::Error),
}

/// Pagination metadata emitted alongside a page of results.
///
/// Serialises to the camelCase JSON object carried in the
/// [`X_PAGINATION`] header. `previousPageLink` is omitted on the first
/// page; `nextPageLink` is always present, even past the last page —
/// suppressing it would hide the caller-visible edge case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    /// Link to the previous page; absent exactly when `current_page == 1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page_link: Option<String>,
    /// Link to the next page, computed unconditionally.
    pub next_page_link: String,
    /// Total number of records in the collection.
    pub total_count: u64,
    /// Records per page after clamping.
    pub page_size: u32,
    /// 1-indexed page this metadata describes.
    pub current_page: u32,
    /// `ceil(total_count / page_size)`.
    pub total_pages: u64,
}

impl PageMetadata {
    /// Compute metadata for one page of a collection rooted at `base_path`.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageMetadata, PageRequest};
    ///
    /// let request = PageRequest::from_raw(Some(2), Some(10));
    /// let metadata = PageMetadata::new("/api/v1/users", request, 25);
    /// assert_eq!(metadata.total_pages, 3);
    /// assert!(metadata.previous_page_link.is_some());
    /// ```
    #[must_use]
    pub fn new(base_path: &str, request: PageRequest, total_count: u64) -> Self {
        let previous_page_link = (request.number() > DEFAULT_PAGE_NUMBER)
            .then(|| page_link(base_path, request.number() - 1, request.size()));
        let next_page_link = page_link(base_path, request.number().saturating_add(1), request.size());

        Self {
            previous_page_link,
            next_page_link,
            total_count,
            page_size: request.size(),
            current_page: request.number(),
            total_pages: total_pages(total_count, request.size()),
        }
    }

    /// Serialise the metadata into a single header value.
    ///
    /// # Errors
    /// Returns [`PaginationError::Serialise`] when JSON encoding fails.
    pub fn to_header_value(&self) -> Result<String, PaginationError> {
        Ok(serde_json::to_string(self)?)
    }
}
