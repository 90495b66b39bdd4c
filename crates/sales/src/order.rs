use serde::{Deserialize, Serialize};

use fruitsupply_core::Document;

/// How an order is delivered.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    Standard,
    Express,
}

/// A customer order. Replaced in full on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub fruit_name: String,
    pub quantity: u32,
    pub delivery_address: String,
    pub total_price: f64,
    pub delivery_type: DeliveryType,
    #[serde(default)]
    pub comments: Option<String>,
}

impl Document for Order {
    const COLLECTION: &'static str = "orders";
}
