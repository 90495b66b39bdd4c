//! Typed access to the three collections.
//!
//! Each store-access function returns a typed `StoreResult`; mapping error
//! kinds to responses is left to the caller.

pub mod collection;
pub mod fruits;
pub mod inventory;
pub mod orders;

pub use collection::{Collection, Stored};
pub use fruits::FruitRepository;
pub use inventory::InventoryRepository;
pub use orders::OrderRepository;
