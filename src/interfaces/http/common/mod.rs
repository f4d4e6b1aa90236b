//! Response helpers shared by all HTTP modules

pub mod error;
pub mod etag;
pub mod pagination;
pub mod validated_json;

pub use error::{render_plain_errors, route_not_found, ApiError, ErrorResponse, FieldErrors};
pub use etag::{conditional_json, Etag};
pub use pagination::{
    PagedJson, PaginationContext, PaginationParams, PAGINATION_HEADER,
};
pub use validated_json::ValidatedJson;
