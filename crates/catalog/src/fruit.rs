use serde::{Deserialize, Serialize};

use fruitsupply_core::Document;

/// A catalog entry, keyed by its natural `name`.
///
/// `price` is declared non-negative but only its type is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fruit {
    pub name: String,
    pub region: String,
    pub season: String,
    pub shelf_life_days: u32,
    pub price: f64,
    pub ripe: bool,
}

impl Document for Fruit {
    const COLLECTION: &'static str = "fruits";
    const UNIQUE_FIELDS: &'static [&'static str] = &[Fruit::NAME_FIELD];
}

impl Fruit {
    pub const NAME_FIELD: &'static str = "name";
    pub const PRICE_FIELD: &'static str = "price";
}

/// Body of a price-only update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FruitPriceUpdate {
    pub price: f64,
}
