//! Item handlers

use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, State},
    http::HeaderMap,
    response::Response,
};

use super::dto::{ItemDto, UpdateItemRequest};
use crate::domain::{DomainError, Item, ItemRepository};
use crate::interfaces::http::common::{
    conditional_json, ApiError, ErrorResponse, Etag, PaginationContext, PaginationParams,
    ValidatedJson,
};
use crate::shared::types::PaginationConfig;

/// Item handler state
#[derive(Clone)]
pub struct ItemHandlerState {
    pub repo: Arc<dyn ItemRepository>,
    pub pagination: PaginationConfig,
}

impl FromRef<ItemHandlerState> for PaginationConfig {
    fn from_ref(state: &ItemHandlerState) -> Self {
        state.pagination
    }
}

async fn find_item(repo: &dyn ItemRepository, item_id: u64) -> Result<Item, ApiError> {
    repo.find_by_id(item_id).await?.ok_or_else(|| {
        ApiError::Domain(DomainError::NotFound {
            entity: "Item",
            field: "item_id",
            value: item_id.to_string(),
        })
    })
}

/// Fetches only the requested window and counts separately.
#[utoipa::path(
    get,
    path = "/api/v1/items",
    tag = "Items",
    params(
        PaginationParams,
        ("If-None-Match" = Option<String>, Header, description = "Entity tag from a previous response")
    ),
    responses(
        (status = 200, description = "One page of items", body = Vec<ItemDto>,
            headers(
                ("X-Pagination" = String, description = "PaginationMetadata serialized as JSON"),
                ("ETag" = String, description = "Entity tag of the page and its metadata")
            )
        ),
        (status = 304, description = "Client copy is current"),
        (status = 404, description = "Page out of range", body = ErrorResponse),
        (status = 422, description = "Invalid pagination parameters", body = ErrorResponse)
    )
)]
pub async fn list_items(
    State(state): State<ItemHandlerState>,
    mut pagination: PaginationContext,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let items = state
        .repo
        .find_range(pagination.first_item(), pagination.page_size())
        .await?;
    pagination.set_item_count(state.repo.count().await?)?;

    let items: Vec<ItemDto> = items.into_iter().map(ItemDto::from).collect();
    pagination.finish(items)?.into_conditional_response(&headers)
}

/// Loads the full collection and lets the paginator slice it.
#[utoipa::path(
    get,
    path = "/api/v1/items/all",
    tag = "Items",
    params(
        PaginationParams,
        ("If-None-Match" = Option<String>, Header, description = "Entity tag from a previous response")
    ),
    responses(
        (status = 200, description = "One page of items", body = Vec<ItemDto>,
            headers(
                ("X-Pagination" = String, description = "PaginationMetadata serialized as JSON"),
                ("ETag" = String, description = "Entity tag of the page and its metadata")
            )
        ),
        (status = 304, description = "Client copy is current"),
        (status = 404, description = "Page out of range", body = ErrorResponse),
        (status = 422, description = "Invalid pagination parameters", body = ErrorResponse)
    )
)]
pub async fn list_all_items(
    State(state): State<ItemHandlerState>,
    pagination: PaginationContext,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let items: Vec<ItemDto> = state
        .repo
        .find_all()
        .await?
        .into_iter()
        .map(ItemDto::from)
        .collect();
    pagination.paginate(items)?.into_conditional_response(&headers)
}

#[utoipa::path(
    get,
    path = "/api/v1/items/{item_id}",
    tag = "Items",
    params(
        ("item_id" = u64, Path, description = "Item id"),
        ("If-None-Match" = Option<String>, Header, description = "Entity tag from a previous response")
    ),
    responses(
        (status = 200, description = "Item", body = ItemDto,
            headers(("ETag" = String, description = "Entity tag of the item"))
        ),
        (status = 304, description = "Client copy is current"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_item(
    State(state): State<ItemHandlerState>,
    Path(item_id): Path<u64>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let item = find_item(state.repo.as_ref(), item_id).await?;
    conditional_json(&headers, ItemDto::from(item))
}

#[utoipa::path(
    put,
    path = "/api/v1/items/{item_id}",
    tag = "Items",
    params(
        ("item_id" = u64, Path, description = "Item id"),
        ("If-Match" = String, Header, description = "Entity tag of the item being replaced")
    ),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Updated item", body = ItemDto,
            headers(("ETag" = String, description = "Entity tag of the updated item"))
        ),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 412, description = "If-Match does not match the current item", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 428, description = "If-Match header missing", body = ErrorResponse)
    )
)]
pub async fn update_item(
    State(state): State<ItemHandlerState>,
    Path(item_id): Path<u64>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<UpdateItemRequest>,
) -> Result<Response, ApiError> {
    let current = find_item(state.repo.as_ref(), item_id).await?;
    Etag::for_json(&ItemDto::from(current.clone()))
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .check_if_match(&headers)?;

    // A writer that committed since `current` was read turns this into a 412.
    let updated = state
        .repo
        .update_if(Item::new(item_id, request.field), &current)
        .await?;
    conditional_json(&HeaderMap::new(), ItemDto::from(updated))
}
