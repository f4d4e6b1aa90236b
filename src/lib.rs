//! # REST pagination
//!
//! Response-shaping helpers for axum REST APIs: page/page-size pagination
//! with an `X-Pagination` metadata header, ETag-based conditional requests,
//! and a uniform JSON error body.
//!
//! ## Architecture
//!
//! - **shared**: pagination arithmetic, error types, shutdown signal
//! - **domain**: the sample item aggregate and its repository trait
//! - **infrastructure**: in-memory item storage
//! - **interfaces::http**: extractors, responses, handlers and router
//! - **server**: tracing setup and serve loop

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use interfaces::http::common::{
    ApiError, ErrorResponse, Etag, PagedJson, PaginationContext, PaginationParams,
    PAGINATION_HEADER,
};
pub use interfaces::http::{create_api_router, ApiDoc};
pub use shared::types::{
    Page, PaginationConfig, PaginationError, PaginationMetadata, PaginationParameters,
};
