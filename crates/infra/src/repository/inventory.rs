use std::sync::Arc;

use fruitsupply_core::DocumentId;
use fruitsupply_inventory::InventoryItem;

use super::collection::{set_one, Collection, Stored};
use crate::document_store::{DocumentStore, Filter, StoreResult};

/// Inventory items, addressed by store id.
#[derive(Clone)]
pub struct InventoryRepository {
    items: Collection<InventoryItem>,
}

impl InventoryRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            items: Collection::new(store),
        }
    }

    pub async fn add(&self, item: &InventoryItem) -> StoreResult<DocumentId> {
        self.items.insert(item).await
    }

    pub async fn get(&self, id: DocumentId) -> StoreResult<Stored<InventoryItem>> {
        self.items.find(&Filter::by_id(id), &label(id)).await
    }

    pub async fn replace(&self, id: DocumentId, item: &InventoryItem) -> StoreResult<()> {
        self.items.replace(&Filter::by_id(id), item, &label(id)).await
    }

    /// Overwrite `quantity` only; `last_updated` is left as it was.
    pub async fn set_quantity(&self, id: DocumentId, quantity: u64) -> StoreResult<()> {
        self.items
            .set_fields(
                &Filter::by_id(id),
                set_one(InventoryItem::QUANTITY_FIELD, quantity),
                &label(id),
            )
            .await
    }

    pub async fn delete(&self, id: DocumentId) -> StoreResult<()> {
        self.items.delete(&Filter::by_id(id), &label(id)).await
    }
}

fn label(id: DocumentId) -> String {
    format!("inventory item {id}")
}
