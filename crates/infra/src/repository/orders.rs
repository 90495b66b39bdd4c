use std::sync::Arc;

use fruitsupply_core::DocumentId;
use fruitsupply_sales::Order;

use super::collection::{Collection, Stored};
use crate::document_store::{DocumentStore, Filter, StoreResult};

/// Customer orders, addressed by store id.
#[derive(Clone)]
pub struct OrderRepository {
    orders: Collection<Order>,
}

impl OrderRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            orders: Collection::new(store),
        }
    }

    pub async fn place(&self, order: &Order) -> StoreResult<DocumentId> {
        self.orders.insert(order).await
    }

    pub async fn get(&self, id: DocumentId) -> StoreResult<Stored<Order>> {
        self.orders.find(&Filter::by_id(id), &label(id)).await
    }

    pub async fn replace(&self, id: DocumentId, order: &Order) -> StoreResult<()> {
        self.orders.replace(&Filter::by_id(id), order, &label(id)).await
    }

    pub async fn delete(&self, id: DocumentId) -> StoreResult<()> {
        self.orders.delete(&Filter::by_id(id), &label(id)).await
    }
}

fn label(id: DocumentId) -> String {
    format!("order {id}")
}
