//! Domain layer: the sample item aggregate served by the API

pub mod item;

pub use crate::shared::types::errors::{DomainError, DomainResult};
pub use item::{Item, ItemRepository};
