//! API router and OpenAPI document

use std::sync::Arc;
use std::time::Instant;

use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::{ContentBuilder, Ref, ResponseBuilder};
use utoipa::{Modify, OpenApi};

use super::common::{render_plain_errors, route_not_found, ErrorResponse};
use super::modules::request_id::request_id_middleware;
use super::modules::{health, items};
use crate::domain::ItemRepository;
use crate::shared::types::{PaginationConfig, PaginationMetadata};

/// Registers the shared error responses under `components.responses`.
struct ErrorResponsesAddon;

impl Modify for ErrorResponsesAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let responses = [
            ("UNPROCESSABLE_ENTITY", "Unprocessable Entity"),
            ("NOT_FOUND", "Not Found"),
            ("PRECONDITION_FAILED", "Precondition Failed"),
            ("PRECONDITION_REQUIRED", "Precondition Required"),
            ("DEFAULT_ERROR", "Default error response"),
        ];
        for (name, description) in responses {
            let response = ResponseBuilder::new()
                .description(description)
                .content(
                    "application/json",
                    ContentBuilder::new()
                        .schema(Some(Ref::from_schema_name("ErrorResponse")))
                        .build(),
                )
                .build();
            components.responses.insert(name.to_string(), response.into());
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        items::list_items,
        items::list_all_items,
        items::get_item,
        items::update_item,
    ),
    components(
        schemas(
            ErrorResponse,
            PaginationMetadata,
            items::ItemDto,
            items::UpdateItemRequest,
            health::HealthResponse,
            health::StorageHealth,
            health::PaginationBounds,
        )
    ),
    modifiers(&ErrorResponsesAddon),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Items", description = "Paginated item collection with conditional requests"),
    ),
    info(
        title = "REST Pagination API",
        version = "1.0.0",
        description = "Paginated collections with X-Pagination metadata, ETags and structured errors",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(repo: Arc<dyn ItemRepository>, pagination: PaginationConfig) -> Router {
    let item_state = items::ItemHandlerState {
        repo: repo.clone(),
        pagination,
    };
    let item_routes = Router::new()
        .route("/", get(items::list_items))
        .route("/all", get(items::list_all_items))
        .route(
            "/{item_id}",
            get(items::get_item).put(items::update_item),
        )
        .with_state(item_state);

    let health_state = health::HealthState {
        repo,
        pagination,
        started_at: Arc::new(Instant::now()),
    };

    // CORS configuration; pagination and ETag headers must be readable by browsers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .with_state(health_state)
        .nest("/api/v1/items", item_routes)
        .fallback(route_not_found)
        .layer(middleware::from_fn(render_plain_errors))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ── Tests ──────────────────────────────────────────────────────
