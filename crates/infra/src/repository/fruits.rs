use std::sync::Arc;

use fruitsupply_catalog::Fruit;
use fruitsupply_core::DocumentId;

use super::collection::{set_one, Collection, Stored};
use crate::document_store::{DocumentStore, Filter, StoreResult};

/// Fruit catalog, addressed by natural key (`name`).
#[derive(Clone)]
pub struct FruitRepository {
    fruits: Collection<Fruit>,
}

impl FruitRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            fruits: Collection::new(store),
        }
    }

    /// Register the unique index on `name`. Call once at startup.
    pub async fn init(&self) -> StoreResult<()> {
        self.fruits.ensure_constraints().await
    }

    pub async fn add(&self, fruit: &Fruit) -> StoreResult<DocumentId> {
        self.fruits.insert(fruit).await
    }

    pub async fn get(&self, name: &str) -> StoreResult<Stored<Fruit>> {
        self.fruits.find(&by_name(name), &label(name)).await
    }

    pub async fn update_price(&self, name: &str, price: f64) -> StoreResult<()> {
        self.fruits
            .set_fields(&by_name(name), set_one(Fruit::PRICE_FIELD, price), &label(name))
            .await
    }

    /// Replace the entry currently named `name`; the new record may rename it.
    pub async fn replace(&self, name: &str, fruit: &Fruit) -> StoreResult<()> {
        self.fruits.replace(&by_name(name), fruit, &label(name)).await
    }

    pub async fn delete(&self, name: &str) -> StoreResult<()> {
        self.fruits.delete(&by_name(name), &label(name)).await
    }
}

fn by_name(name: &str) -> Filter {
    Filter::eq(Fruit::NAME_FIELD, name)
}

fn label(name: &str) -> String {
    format!("fruit '{name}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_store::{InMemoryDocumentStore, StoreError};

    fn apple() -> Fruit {
        Fruit {
            name: "Apple".into(),
            region: "Kashmir".into(),
            season: "Autumn".into(),
            shelf_life_days: 30,
            price: 120.0,
            ripe: false,
        }
    }

    async fn repo() -> (Arc<InMemoryDocumentStore>, FruitRepository) {
        let store = Arc::new(InMemoryDocumentStore::new());
        let repo = FruitRepository::new(store.clone());
        repo.init().await.unwrap();
        (store, repo)
    }

    #[tokio::test]
    async fn add_then_get_returns_same_record_with_id() {
        let (_store, repo) = repo().await;
        let id = repo.add(&apple()).await.unwrap();

        let stored = repo.get("Apple").await.unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.record, apple());
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_and_original_kept() {
        let (store, repo) = repo().await;
        repo.add(&apple()).await.unwrap();

        let mut imposter = apple();
        imposter.price = 1.0;
        let err = repo.add(&imposter).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));

        assert_eq!(store.count("fruits"), 1);
        assert_eq!(repo.get("Apple").await.unwrap().record.price, 120.0);
    }

    #[tokio::test]
    async fn price_update_on_missing_fruit_creates_nothing() {
        let (store, repo) = repo().await;

        let err = repo.update_price("Mango", 45.0).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound("fruit 'Mango'".into()));
        assert_eq!(store.count("fruits"), 0);
    }

    #[tokio::test]
    async fn price_update_touches_only_price() {
        let (_store, repo) = repo().await;
        repo.add(&apple()).await.unwrap();

        repo.update_price("Apple", 99.5).await.unwrap();
        let stored = repo.get("Apple").await.unwrap();
        assert_eq!(stored.record.price, 99.5);
        assert_eq!(stored.record.region, "Kashmir");
    }

    #[tokio::test]
    async fn replace_can_rename_but_not_onto_existing_name() {
        let (_store, repo) = repo().await;
        repo.add(&apple()).await.unwrap();
        let mut pear = apple();
        pear.name = "Pear".into();
        repo.add(&pear).await.unwrap();

        let mut green = apple();
        green.name = "Green Apple".into();
        repo.replace("Apple", &green).await.unwrap();
        assert!(repo.get("Apple").await.is_err());
        assert_eq!(repo.get("Green Apple").await.unwrap().record.name, "Green Apple");

        let err = repo.replace("Pear", &green).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let (_store, repo) = repo().await;
        repo.add(&apple()).await.unwrap();

        repo.delete("Apple").await.unwrap();
        assert!(matches!(repo.delete("Apple").await, Err(StoreError::NotFound(_))));
    }
}
