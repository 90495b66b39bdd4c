use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use fruitsupply_core::{Document, DocumentId};

use crate::document_store::{DocumentStore, Filter, JsonMap, RawDocument, StoreError, StoreResult};

/// A record together with its store id, rendered as `{"_id": "...", ...record}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<T> {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(flatten)]
    pub record: T,
}

/// Typed view over one collection of `T` documents.
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Document> Collection<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Register the record type's unique fields on the store.
    pub async fn ensure_constraints(&self) -> StoreResult<()> {
        for field in T::UNIQUE_FIELDS {
            self.store.ensure_unique(T::COLLECTION, field).await?;
        }
        Ok(())
    }

    pub async fn insert(&self, record: &T) -> StoreResult<DocumentId> {
        self.store.insert_one(T::COLLECTION, to_document(record)?).await
    }

    /// Fetch the first match; `what` names the record in the not-found error.
    pub async fn find(&self, filter: &Filter, what: &str) -> StoreResult<Stored<T>> {
        match self.store.find_one(T::COLLECTION, filter).await? {
            Some(raw) => from_document(raw),
            None => Err(StoreError::not_found(what)),
        }
    }

    pub async fn set_fields(&self, filter: &Filter, fields: JsonMap, what: &str) -> StoreResult<()> {
        let touched = self.store.set_fields(T::COLLECTION, filter, fields).await?;
        found(touched, what)
    }

    pub async fn replace(&self, filter: &Filter, record: &T, what: &str) -> StoreResult<()> {
        let touched = self
            .store
            .replace_one(T::COLLECTION, filter, to_document(record)?)
            .await?;
        found(touched, what)
    }

    pub async fn delete(&self, filter: &Filter, what: &str) -> StoreResult<()> {
        let touched = self.store.delete_one(T::COLLECTION, filter).await?;
        found(touched, what)
    }
}

/// Single-field `$set` body.
pub(crate) fn set_one(field: &str, value: impl Into<JsonValue>) -> JsonMap {
    let mut fields = JsonMap::new();
    fields.insert(field.to_string(), value.into());
    fields
}

fn found(touched: u64, what: &str) -> StoreResult<()> {
    if touched == 0 {
        Err(StoreError::not_found(what))
    } else {
        Ok(())
    }
}

fn to_document<T: Document>(record: &T) -> StoreResult<JsonMap> {
    match serde_json::to_value(record)? {
        JsonValue::Object(mut body) => {
            // The store owns `_id`; never let a record shadow it.
            body.remove("_id");
            Ok(body)
        }
        other => Err(StoreError::Serialization(format!(
            "{} record must encode to a JSON object, got {other}",
            T::COLLECTION
        ))),
    }
}

fn from_document<T: Document>(raw: RawDocument) -> StoreResult<Stored<T>> {
    let record = serde_json::from_value(JsonValue::Object(raw.body))?;
    Ok(Stored { id: raw.id, record })
}
