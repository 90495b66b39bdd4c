//! Customer orders.
//!
//! An order names a fruit by `fruit_name` only; nothing checks that the fruit
//! exists in the catalog.

pub mod order;

pub use order::{DeliveryType, Order};
