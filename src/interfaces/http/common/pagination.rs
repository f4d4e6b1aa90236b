//! Pagination for axum handlers
//!
//! A paginated request runs through four stages, any of which can stop it
//! with an [`ApiError`]:
//!
//! 1. **parse**: [`PaginationContext`] is extracted from the query string,
//!    defaults come from the router's [`PaginationConfig`], bounds are
//!    checked (422);
//! 2. **handle**: the handler reads `first_item()` / `last_item()` and
//!    reports the total with [`PaginationContext::set_item_count`];
//! 3. **resolve**: [`PaginationContext::finish`] (handler sliced the data) or
//!    [`PaginationContext::paginate`] (we slice it) checks the page against
//!    the total (404);
//! 4. **serialize**: [`PagedJson`] writes the JSON array and `X-Pagination`.
//!
//! ```ignore
//! async fn list(
//!     State(repo): State<Arc<dyn ItemRepository>>,
//!     mut pagination: PaginationContext,
//! ) -> Result<PagedJson<Item>, ApiError> {
//!     let items = repo.find_range(pagination.first_item(), pagination.page_size()).await?;
//!     pagination.set_item_count(repo.count().await?)?;
//!     Ok(pagination.finish(items)?)
//! }
//! ```

use axum::extract::{FromRef, FromRequestParts, Query};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::IntoParams;
use validator::Validate;

use super::error::ApiError;
use super::etag::{self, Etag};
use crate::shared::types::{
    Page, PaginationConfig, PaginationError, PaginationMetadata, PaginationParameters,
    DEFAULT_PAGE,
};

/// Response header carrying [`PaginationMetadata`] as JSON.
pub const PAGINATION_HEADER: &str = "x-pagination";

/// Raw pagination query parameters
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number, starting at 1. Default: 1
    #[validate(range(min = 1, message = "Must be greater than or equal to 1."))]
    #[param(minimum = 1, default = 1)]
    pub page: Option<i64>,
    /// Number of items per page. The default and maximum shown are the
    /// built-in values; the `[pagination]` config section overrides them and
    /// `/health` reports the active bounds.
    #[validate(range(min = 1, message = "Must be greater than or equal to 1."))]
    #[param(minimum = 1, maximum = 100, default = 10)]
    pub page_size: Option<i64>,
}

impl PaginationParams {
    /// Apply defaults and bounds from `config`.
    pub fn into_parameters(
        self,
        config: &PaginationConfig,
    ) -> Result<PaginationParameters, ApiError> {
        self.validate()
            .map_err(|e| ApiError::from_validation("query", e))?;
        let page = self.page.unwrap_or(DEFAULT_PAGE as i64);
        let page_size = match self.page_size {
            Some(page_size) => page_size,
            None => i64::try_from(config.default_page_size).map_err(|_| {
                ApiError::Internal(format!(
                    "default page size {} exceeds the query range",
                    config.default_page_size
                ))
            })?,
        };
        Ok(PaginationParameters::new(page, page_size, config)?)
    }
}

/// Per-request pagination state handed to the handler.
///
/// Holds the validated parameters and the single-assignment item count
/// slot. Each request extracts its own context, so counts never leak
/// between concurrent requests.
#[derive(Debug)]
pub struct PaginationContext {
    params: PaginationParameters,
    item_count: Option<u64>,
}

impl PaginationContext {
    pub fn new(params: PaginationParameters) -> Self {
        Self {
            params,
            item_count: None,
        }
    }

    pub fn params(&self) -> PaginationParameters {
        self.params
    }

    pub fn page(&self) -> u64 {
        self.params.page()
    }

    pub fn page_size(&self) -> u64 {
        self.params.page_size()
    }

    pub fn first_item(&self) -> u64 {
        self.params.first_item()
    }

    pub fn last_item(&self) -> u64 {
        self.params.last_item()
    }

    pub fn item_count(&self) -> Option<u64> {
        self.item_count
    }

    /// Record the total number of items. May be called once per request.
    pub fn set_item_count(&mut self, count: u64) -> Result<(), PaginationError> {
        if self.item_count.is_some() {
            return Err(PaginationError::ItemCountAlreadySet);
        }
        self.item_count = Some(count);
        Ok(())
    }

    /// Pre-slicing mode: `items` is already the requested page.
    ///
    /// Without an item count the response is still sent, only without
    /// pagination metadata.
    pub fn finish<T>(self, items: Vec<T>) -> Result<PagedJson<T>, PaginationError> {
        let metadata = match self.item_count {
            Some(total) => Some(self.params.resolve(total)?),
            None => {
                warn!(
                    params = %self.params,
                    "Item count not set, omitting pagination header"
                );
                None
            }
        };
        Ok(PagedJson { items, metadata })
    }

    /// Post-slicing mode: `collection` is the full result set.
    pub fn paginate<T>(mut self, collection: Vec<T>) -> Result<PagedJson<T>, PaginationError> {
        let page = Page::new(collection, self.params);
        self.set_item_count(page.item_count())?;
        let (items, metadata) = page.resolve()?;
        Ok(PagedJson {
            items,
            metadata: Some(metadata),
        })
    }
}

impl<S> FromRequestParts<S> for PaginationContext
where
    S: Send + Sync,
    PaginationConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = PaginationConfig::from_ref(state);
        let Query(raw) = Query::<PaginationParams>::from_request_parts(parts, state).await?;
        Ok(PaginationContext::new(raw.into_parameters(&config)?))
    }
}

/// One page of items plus the metadata for the `X-Pagination` header.
#[derive(Debug)]
pub struct PagedJson<T> {
    pub items: Vec<T>,
    pub metadata: Option<PaginationMetadata>,
}

impl<T: Serialize> PagedJson<T> {
    /// Tag over both the items and the metadata, so a changed total
    /// produces a new tag even when the page itself is unchanged.
    pub fn etag(&self) -> Result<Etag, ApiError> {
        #[derive(Serialize)]
        struct Tagged<'a, T> {
            items: &'a [T],
            pagination: &'a Option<PaginationMetadata>,
        }
        Etag::for_json(&Tagged {
            items: &self.items,
            pagination: &self.metadata,
        })
        .map_err(|e| ApiError::Internal(e.to_string()))
    }

    /// Like `into_response`, but answers 304 when the client's copy is current.
    pub fn into_conditional_response(self, headers: &HeaderMap) -> Result<Response, ApiError> {
        let tag = self.etag()?;
        if tag.matches_if_none_match(headers) {
            return Ok(etag::not_modified(&tag));
        }
        let mut response = self.try_into_response()?;
        response.headers_mut().insert(
            axum::http::header::ETAG,
            tag.to_header_value(),
        );
        Ok(response)
    }

    fn try_into_response(self) -> Result<Response, ApiError> {
        let header = self
            .metadata
            .as_ref()
            .map(|meta| meta.to_header_value())
            .transpose()?;

        let mut response = Json(self.items).into_response();
        if let Some(header) = header {
            let value = HeaderValue::from_str(&header)
                .map_err(|e| ApiError::Internal(e.to_string()))?;
            response
                .headers_mut()
                .insert(HeaderName::from_static(PAGINATION_HEADER), value);
        }
        Ok(response)
    }
}

impl<T: Serialize> IntoResponse for PagedJson<T> {
    fn into_response(self) -> Response {
        self.try_into_response()
            .unwrap_or_else(IntoResponse::into_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(page: i64, page_size: i64) -> PaginationContext {
        PaginationContext::new(
            PaginationParameters::new(page, page_size, &PaginationConfig::default()).unwrap(),
        )
    }

    fn header_json(response: &Response) -> Option<serde_json::Value> {
        response
            .headers()
            .get(PAGINATION_HEADER)
            .map(|v| serde_json::from_str(v.to_str().unwrap()).unwrap())
    }

    #[test]
    fn test_defaults_from_config() {
        let config = PaginationConfig {
            default_page_size: 25,
            max_page_size: 50,
        };
        let params = PaginationParams::default().into_parameters(&config).unwrap();
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 25);
    }

    #[test]
    fn test_oversized_default_page_size_is_not_wrapped() {
        let config = PaginationConfig {
            default_page_size: u64::MAX,
            max_page_size: u64::MAX,
        };
        let err = PaginationParams::default()
            .into_parameters(&config)
            .unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn test_negative_values_fail_validation() {
        let raw = PaginationParams {
            page: Some(-42),
            page_size: Some(0),
        };
        let err = raw.into_parameters(&PaginationConfig::default()).unwrap_err();
        match err {
            ApiError::Validation { location, fields } => {
                assert_eq!(location, "query");
                assert!(fields.contains_key("page"));
                assert!(fields.contains_key("page_size"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_page_size_above_max_is_rejected() {
        let raw = PaginationParams {
            page: None,
            page_size: Some(101),
        };
        let err = raw.into_parameters(&PaginationConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Pagination(PaginationError::InvalidPageSize { page_size: 101, .. })
        ));
    }

    #[test]
    fn test_item_count_set_once() {
        let mut ctx = context(1, 10);
        assert_eq!(ctx.item_count(), None);
        ctx.set_item_count(5).unwrap();
        assert!(matches!(
            ctx.set_item_count(6),
            Err(PaginationError::ItemCountAlreadySet)
        ));
        assert_eq!(ctx.item_count(), Some(5));
    }

    #[test]
    fn test_finish_without_count_omits_header() {
        let paged = context(1, 10).finish(vec![1, 2]).unwrap();
        assert!(paged.metadata.is_none());

        let response = paged.into_response();
        assert!(response.headers().get(PAGINATION_HEADER).is_none());
    }

    #[test]
    fn test_finish_with_count_sets_header() {
        let mut ctx = context(2, 5);
        let items: Vec<u32> = (5..10).collect();
        ctx.set_item_count(1000).unwrap();

        let response = ctx.finish(items).unwrap().into_response();
        assert_eq!(
            header_json(&response).unwrap(),
            serde_json::json!({
                "total": 1000,
                "total_pages": 200,
                "first_page": 1,
                "last_page": 200,
                "previous_page": 1,
                "next_page": 3,
            })
        );
    }

    #[test]
    fn test_finish_out_of_range() {
        let mut ctx = context(120, 10);
        ctx.set_item_count(1000).unwrap();
        assert!(matches!(
            ctx.finish(Vec::<u32>::new()),
            Err(PaginationError::PageOutOfRange { .. })
        ));
    }

    #[test]
    fn test_paginate_conflicts_with_explicit_count() {
        let mut ctx = context(1, 10);
        ctx.set_item_count(3).unwrap();
        assert!(matches!(
            ctx.paginate(vec![1, 2, 3]),
            Err(PaginationError::ItemCountAlreadySet)
        ));
    }

    #[test]
    fn test_modes_agree() {
        let collection: Vec<u32> = (0..1000).collect();

        let post = context(334, 3).paginate(collection.clone()).unwrap();

        let mut pre_ctx = context(334, 3);
        let (first, last) = (pre_ctx.first_item() as usize, pre_ctx.last_item() as usize);
        let window = collection[first..=last.min(collection.len() - 1)].to_vec();
        pre_ctx.set_item_count(collection.len() as u64).unwrap();
        let pre = pre_ctx.finish(window).unwrap();

        assert_eq!(pre.items, post.items);
        assert_eq!(pre.metadata, post.metadata);
    }

    #[test]
    fn test_etag_changes_with_total() {
        let mut a = context(1, 2);
        a.set_item_count(10).unwrap();
        let mut b = context(1, 2);
        b.set_item_count(11).unwrap();

        let tag_a = a.finish(vec![1, 2]).unwrap().etag().unwrap();
        let tag_b = b.finish(vec![1, 2]).unwrap().etag().unwrap();
        assert_ne!(tag_a, tag_b);
    }
}
