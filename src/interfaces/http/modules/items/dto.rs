//! Item DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::Item;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemDto {
    pub item_id: u64,
    pub field: i64,
}

impl From<Item> for ItemDto {
    fn from(item: Item) -> Self {
        Self {
            item_id: item.item_id,
            field: item.field,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateItemRequest {
    #[validate(range(min = 0, message = "Must be greater than or equal to 0."))]
    pub field: i64,
}
