//! Fruit catalog records.
//!
//! Plain data only; persistence lives in the infra crate.

pub mod fruit;

pub use fruit::{Fruit, FruitPriceUpdate};
