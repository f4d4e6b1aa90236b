//! In-memory item storage

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{DomainError, DomainResult, Item, ItemRepository};

/// In-memory item store for development and testing.
///
/// Items are kept sorted by `item_id`.
pub struct InMemoryItemRepository {
    items: RwLock<Vec<Item>>,
}

impl InMemoryItemRepository {
    pub fn new(mut items: Vec<Item>) -> Self {
        items.sort_by_key(|item| item.item_id);
        Self {
            items: RwLock::new(items),
        }
    }

    /// `count` items where `field` is the zero-based index and
    /// `item_id` is `field + 1`.
    pub fn with_sequence(count: u64) -> Self {
        Self::new(
            (0..count)
                .map(|index| Item::new(index + 1, index as i64))
                .collect(),
        )
    }
}

impl Default for InMemoryItemRepository {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn count(&self) -> DomainResult<u64> {
        Ok(self.items.read().await.len() as u64)
    }

    async fn find_range(&self, offset: u64, limit: u64) -> DomainResult<Vec<Item>> {
        let items = self.items.read().await;
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(items.iter().skip(skip).take(take).cloned().collect())
    }

    async fn find_all(&self) -> DomainResult<Vec<Item>> {
        Ok(self.items.read().await.clone())
    }

    async fn find_by_id(&self, item_id: u64) -> DomainResult<Option<Item>> {
        let items = self.items.read().await;
        Ok(items
            .binary_search_by_key(&item_id, |item| item.item_id)
            .ok()
            .map(|pos| items[pos].clone()))
    }

    async fn update_if(&self, item: Item, expected: &Item) -> DomainResult<Item> {
        let mut items = self.items.write().await;
        let pos = items
            .binary_search_by_key(&item.item_id, |existing| existing.item_id)
            .map_err(|_| DomainError::NotFound {
                entity: "Item",
                field: "item_id",
                value: item.item_id.to_string(),
            })?;
        if items[pos] != *expected {
            return Err(DomainError::Modified {
                entity: "Item",
                field: "item_id",
                value: item.item_id.to_string(),
            });
        }
        items[pos] = item.clone();
        Ok(item)
    }
}
