//! Item repository interface

use async_trait::async_trait;

use super::Item;
use crate::domain::DomainResult;

#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Total number of stored items.
    async fn count(&self) -> DomainResult<u64>;
    /// Up to `limit` items ordered by id, starting at zero-based `offset`.
    async fn find_range(&self, offset: u64, limit: u64) -> DomainResult<Vec<Item>>;
    async fn find_all(&self) -> DomainResult<Vec<Item>>;
    async fn find_by_id(&self, item_id: u64) -> DomainResult<Option<Item>>;
    /// Replace the stored item only if it still equals `expected`.
    ///
    /// Compare and write happen under one lock; a mismatch is
    /// [`DomainError::Modified`](crate::domain::DomainError::Modified).
    async fn update_if(&self, item: Item, expected: &Item) -> DomainResult<Item>;
}
