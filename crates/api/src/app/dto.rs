//! Request/response bodies that are not domain records themselves.
//!
//! Create and replace endpoints take the domain types directly (`Fruit`,
//! `Order`, `InventoryItem`); unknown fields, including a client-sent `_id`,
//! are ignored.

use serde::Serialize;

use fruitsupply_core::{DocumentId, TaskId};

pub use fruitsupply_catalog::FruitPriceUpdate;
pub use fruitsupply_inventory::QuantityUpdate;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

#[derive(Debug, Serialize)]
pub struct FruitAddedResponse {
    pub message: &'static str,
    pub fruit_id: DocumentId,
}

#[derive(Debug, Serialize)]
pub struct OrderPlacedResponse {
    pub message: &'static str,
    pub order_id: DocumentId,
}

#[derive(Debug, Serialize)]
pub struct InventoryAddedResponse {
    pub message: &'static str,
    pub inventory_id: DocumentId,
}

#[derive(Debug, Serialize)]
pub struct TaskQueuedResponse {
    pub message: &'static str,
    pub task_id: TaskId,
}
