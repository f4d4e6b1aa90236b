//! Items module: sample paginated collection with ETag support

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
