use std::sync::Arc;

use fruitsupply_core::DocumentId;
use fruitsupply_infra::bootstrap::Backends;
use fruitsupply_infra::repository::{FruitRepository, InventoryRepository, OrderRepository};
use fruitsupply_infra::tasks::reset_inventory::reset_inventory_message;
use fruitsupply_infra::tasks::{QueueError, TaskQueue};

/// Handles every request handler needs. Built once at startup and shared
/// through an `Extension`.
#[derive(Clone)]
pub struct AppServices {
    pub fruits: FruitRepository,
    pub orders: OrderRepository,
    pub inventory: InventoryRepository,
    pub queue: Arc<dyn TaskQueue>,
}

impl AppServices {
    pub fn new(backends: &Backends) -> Self {
        Self {
            fruits: FruitRepository::new(backends.store.clone()),
            orders: OrderRepository::new(backends.store.clone()),
            inventory: InventoryRepository::new(backends.store.clone()),
            queue: backends.queue.clone(),
        }
    }

    /// Queue a reset of `inventory_id` to `quantity` and return the task handle.
    pub async fn queue_inventory_reset(
        &self,
        inventory_id: DocumentId,
        quantity: u64,
    ) -> Result<fruitsupply_core::TaskId, QueueError> {
        self.queue
            .enqueue(reset_inventory_message(&inventory_id.to_string(), quantity))
            .await
    }
}
