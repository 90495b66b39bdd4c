//! In-memory document store for tests/dev.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use fruitsupply_core::DocumentId;

use super::r#trait::{DocumentStore, Filter, JsonMap, RawDocument, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Collection {
    // DocumentId is UUIDv7, so BTreeMap order is insertion order.
    docs: BTreeMap<DocumentId, JsonMap>,
    unique_fields: Vec<String>,
}

impl Collection {
    fn first_match(&self, filter: &Filter) -> Option<DocumentId> {
        self.docs
            .iter()
            .find(|(id, body)| filter.matches(id, body))
            .map(|(id, _)| *id)
    }

    /// Reject `body` if any unique field collides with a document other than `own_id`.
    fn check_unique(&self, name: &str, own_id: Option<DocumentId>, body: &JsonMap) -> StoreResult<()> {
        for field in &self.unique_fields {
            let Some(value) = body.get(field) else {
                continue;
            };
            let clash = self
                .docs
                .iter()
                .any(|(id, other)| Some(*id) != own_id && other.get(field) == Some(value));
            if clash {
                return Err(StoreError::duplicate(name, field, value));
            }
        }
        Ok(())
    }
}

/// Collections held in process memory behind one lock.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    inner: RwLock<HashMap<String, Collection>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.read()
            .map(|map| map.get(collection).map_or(0, |c| c.docs.len()))
            .unwrap_or(0)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<String, Collection>>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<String, Collection>>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn ensure_unique(&self, collection: &str, field: &str) -> StoreResult<()> {
        let mut map = self.write()?;
        let coll = map.entry(collection.to_string()).or_default();
        if coll.unique_fields.iter().any(|f| f == field) {
            return Ok(());
        }

        // Mirror index creation: fail if existing data already violates it.
        let mut seen = Vec::new();
        for body in coll.docs.values() {
            if let Some(value) = body.get(field) {
                if seen.contains(&value) {
                    return Err(StoreError::duplicate(collection, field, value));
                }
                seen.push(value);
            }
        }

        coll.unique_fields.push(field.to_string());
        Ok(())
    }

    async fn insert_one(&self, collection: &str, body: JsonMap) -> StoreResult<DocumentId> {
        let mut map = self.write()?;
        let coll = map.entry(collection.to_string()).or_default();
        coll.check_unique(collection, None, &body)?;

        let id = DocumentId::new();
        coll.docs.insert(id, body);
        Ok(id)
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<RawDocument>> {
        let map = self.read()?;
        let Some(coll) = map.get(collection) else {
            return Ok(None);
        };

        Ok(coll.first_match(filter).and_then(|id| {
            coll.docs.get(&id).map(|body| RawDocument {
                id,
                body: body.clone(),
            })
        }))
    }

    async fn set_fields(&self, collection: &str, filter: &Filter, fields: JsonMap) -> StoreResult<u64> {
        let mut map = self.write()?;
        let Some(coll) = map.get_mut(collection) else {
            return Ok(0);
        };
        let Some(id) = coll.first_match(filter) else {
            return Ok(0);
        };

        let mut updated = coll.docs.get(&id).cloned().unwrap_or_default();
        updated.extend(fields);
        coll.check_unique(collection, Some(id), &updated)?;
        coll.docs.insert(id, updated);
        Ok(1)
    }

    async fn replace_one(&self, collection: &str, filter: &Filter, body: JsonMap) -> StoreResult<u64> {
        let mut map = self.write()?;
        let Some(coll) = map.get_mut(collection) else {
            return Ok(0);
        };
        let Some(id) = coll.first_match(filter) else {
            return Ok(0);
        };

        coll.check_unique(collection, Some(id), &body)?;
        coll.docs.insert(id, body);
        Ok(1)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let mut map = self.write()?;
        let Some(coll) = map.get_mut(collection) else {
            return Ok(0);
        };

        match coll.first_match(filter) {
            Some(id) => {
                coll.docs.remove(&id);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
