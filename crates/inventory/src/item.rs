use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fruitsupply_catalog::Fruit;
use fruitsupply_core::Document;

/// Stock of one fruit.
///
/// `fruit` is an embedded copy, not a reference into the catalog.
/// `last_updated` is whatever the client last sent; quantity-only writes
/// (API or scheduled reset) leave it untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub fruit: Fruit,
    pub quantity: u64,
    pub last_updated: DateTime<Utc>,
}

impl Document for InventoryItem {
    const COLLECTION: &'static str = "inventory";
}

impl InventoryItem {
    pub const QUANTITY_FIELD: &'static str = "quantity";
}

/// Body of a quantity-only update (also the reset trigger body).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityUpdate {
    pub quantity: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_rfc3339_timestamp() {
        let item: InventoryItem = serde_json::from_value(json!({
            "fruit": {
                "name": "Banana",
                "region": "Kerala",
                "season": "All",
                "shelf_life_days": 7,
                "price": 40.0,
                "ripe": true,
            },
            "quantity": 250,
            "last_updated": "2026-01-15T10:30:00Z",
        }))
        .unwrap();

        assert_eq!(item.quantity, 250);
        assert_eq!(item.fruit.name, "Banana");
        assert_eq!(item.last_updated.to_rfc3339(), "2026-01-15T10:30:00+00:00");
    }

    #[test]
    fn negative_quantity_is_rejected() {
        assert!(serde_json::from_value::<QuantityUpdate>(json!({ "quantity": -3 })).is_err());
        assert!(serde_json::from_value::<QuantityUpdate>(json!({ "quantity": "3" })).is_err());
    }
}
