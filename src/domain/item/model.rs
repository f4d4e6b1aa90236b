use serde::{Deserialize, Serialize};

/// A single element of the paginated collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: u64,
    pub field: i64,
}

impl Item {
    pub fn new(item_id: u64, field: i64) -> Self {
        Self { item_id, field }
    }
}
