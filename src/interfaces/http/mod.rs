//! HTTP REST API interfaces
//!
//! - `common`: pagination, ETag and error helpers shared by all handlers
//! - `modules`: request handlers per resource, plus the request-id middleware
//! - `router`: API router and OpenAPI document

pub mod common;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc};
