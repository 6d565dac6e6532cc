//! Process-local item store.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;

use super::types::{Item, NewItem};
use super::ItemStore;

/// In-memory store holding items in ascending id order.
///
/// `create` computes the next id and appends under one write lock, so ids stay
/// unique under concurrent requests.
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    items: RwLock<Vec<Item>>,
}

impl MemoryItemStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the two stock items.
    pub fn seeded() -> Self {
        Self::with_items(vec![
            Item::new(1, "Item 1", "First item"),
            Item::new(2, "Item 2", "Second item"),
        ])
    }

    /// Create a store from existing items.
    pub fn with_items(mut items: Vec<Item>) -> Self {
        items.sort_by_key(|item| item.id);
        Self {
            items: RwLock::new(items),
        }
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.items.read().await.clone())
    }

    async fn get(&self, id: i32) -> Result<Option<Item>, StoreError> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    async fn create(&self, input: NewItem) -> Result<Item, StoreError> {
        let mut items = self.items.write().await;
        // Kept sorted, so the last item carries the max id.
        let id = match items.last() {
            Some(last) => last.id.checked_add(1).ok_or(StoreError::IdsExhausted)?,
            None => 1,
        };
        let item = Item::new(id, input.name(), input.description());
        items.push(item.clone());
        debug!(id, "item stored in memory");
        Ok(item)
    }
}
