//! Pagination core
//!
//! Page arithmetic shared by both usage modes:
//!
//! - **pre-slicing**: the handler asks for `(first_item, last_item)`, fetches
//!   exactly that window from its data source and reports the total count;
//! - **post-slicing**: the handler hands over the whole collection as a
//!   [`Page`], which slices it and uses its length as the total.
//!
//! Both modes go through [`PaginationParameters::resolve`], so equal inputs
//! always give equal [`PaginationMetadata`].

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::errors::PaginationError;

/// Page requested when the query string has none.
pub const DEFAULT_PAGE: u64 = 1;
/// Page size used when neither the query nor the config provide one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Upper bound for `page_size` unless configured otherwise.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Pagination bounds, loaded from the `[pagination]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size applied when the client omits `page_size`.
    pub default_page_size: u64,
    /// Largest `page_size` a client may request.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Validated `page` / `page_size` pair.
///
/// Constructed only through [`PaginationParameters::new`], so both values are
/// always `>= 1` and `page_size` never exceeds the configured maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParameters {
    page: u64,
    page_size: u64,
}

impl PaginationParameters {
    /// Validate raw client input against `config`.
    ///
    /// Signed inputs let negative query values reach this check instead of
    /// failing to parse.
    pub fn new(page: i64, page_size: i64, config: &PaginationConfig) -> Result<Self, PaginationError> {
        if page < 1 {
            return Err(PaginationError::InvalidPage { page });
        }
        if page_size < 1 || page_size as u64 > config.max_page_size {
            return Err(PaginationError::InvalidPageSize {
                page_size,
                max: config.max_page_size,
            });
        }
        Ok(Self {
            page: page as u64,
            page_size: page_size as u64,
        })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Zero-based index of the first item on this page.
    pub fn first_item(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Zero-based, inclusive index of the last item on this page.
    pub fn last_item(&self) -> u64 {
        self.page.saturating_mul(self.page_size) - 1
    }

    /// `(first_item, last_item)`, both zero-based and inclusive.
    pub fn index_range(&self) -> (u64, u64) {
        (self.first_item(), self.last_item())
    }

    /// Check this page against a known total and build its metadata.
    ///
    /// An empty collection still has a valid (empty) first page; any other
    /// page past the last one is [`PaginationError::PageOutOfRange`].
    pub fn resolve(&self, total: u64) -> Result<PaginationMetadata, PaginationError> {
        let metadata = PaginationMetadata::new(self.page, self.page_size, total);
        if self.page > metadata.total_pages.max(1) {
            return Err(PaginationError::PageOutOfRange {
                page: self.page,
                last_page: metadata.total_pages,
            });
        }
        Ok(metadata)
    }
}

impl fmt::Display for PaginationParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PaginationParameters(page={},page_size={})",
            self.page, self.page_size
        )
    }
}

/// Navigation summary sent in the `X-Pagination` header.
///
/// Page links that do not apply are omitted from the JSON, never `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "total": 1000,
    "total_pages": 100,
    "first_page": 1,
    "last_page": 100,
    "previous_page": 1,
    "next_page": 3
}))]
pub struct PaginationMetadata {
    /// Number of items in the whole collection
    pub total: u64,
    /// `ceil(total / page_size)`
    pub total_pages: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u64>,
    #[serde(skip)]
    page: u64,
    #[serde(skip)]
    page_size: u64,
}

impl PaginationMetadata {
    /// Compute metadata for `page` of a `total`-item collection.
    ///
    /// Does not check that `page` exists; see [`PaginationParameters::resolve`].
    pub fn new(page: u64, page_size: u64, total: u64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total - 1) / page_size + 1
        };

        let (first_page, last_page) = if total_pages >= 1 {
            (Some(1), Some(total_pages))
        } else {
            (None, None)
        };

        let previous_page = match first_page {
            Some(first) if page > first => Some(page - 1),
            _ => None,
        };
        let next_page = match last_page {
            Some(last) if page < last => Some(page + 1),
            _ => None,
        };

        Self {
            total,
            total_pages,
            first_page,
            last_page,
            previous_page,
            next_page,
            page,
            page_size,
        }
    }

    /// Header value: compact JSON.
    pub fn to_header_value(&self) -> Result<String, PaginationError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for PaginationMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PaginationMetadata(page={},page_size={},item_count={})",
            self.page, self.page_size, self.total
        )
    }
}

/// A full collection together with the page requested from it.
///
/// Post-slicing mode: consumed once by [`Page::resolve`].
#[derive(Debug, Clone)]
pub struct Page<T> {
    collection: Vec<T>,
    params: PaginationParameters,
}

impl<T> Page<T> {
    pub fn new(collection: Vec<T>, params: PaginationParameters) -> Self {
        Self { collection, params }
    }

    pub fn item_count(&self) -> u64 {
        self.collection.len() as u64
    }

    /// Slice the collection and compute metadata with `len()` as the total.
    pub fn resolve(self) -> Result<(Vec<T>, PaginationMetadata), PaginationError> {
        let metadata = self.params.resolve(self.item_count())?;
        let skip = usize::try_from(self.params.first_item()).unwrap_or(usize::MAX);
        let take = usize::try_from(self.params.page_size()).unwrap_or(usize::MAX);
        let items = self.collection.into_iter().skip(skip).take(take).collect();
        Ok((items, metadata))
    }
}

impl<T: fmt::Debug> fmt::Display for Page<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Page(collection={:?},page_params={})",
            self.collection, self.params
        )
    }
}
