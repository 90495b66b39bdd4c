//! Inventory records: a fruit snapshot plus the quantity on hand.

pub mod item;

pub use item::{InventoryItem, QuantityUpdate};
